use crate::chip_family::{Architecture, CoreType};
use crate::error::LookupError;
use crate::flash_algorithm::FlashAlgorithm;
use crate::memory::MemoryRegion;
use crate::serialize::hex_option;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single chip variant.
///
/// This describes an exact chip variant, including the cores, the JTAG scan chain and the memory
/// map. Memory regions are kept sorted by start address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub(crate) name: String,
    pub(crate) part_number: Option<String>,
    pub(crate) scan_chain: Vec<ScanChainEntry>,
    pub(crate) default_binary_format: BinaryFormat,
    pub(crate) cores: Vec<Core>,
    pub(crate) memory_map: Vec<MemoryRegion>,
    /// Core name => indices into `memory_map` of the regions owned by that core, in address order.
    pub(crate) core_regions: BTreeMap<String, Vec<usize>>,
    pub(crate) flash_algorithms: Vec<FlashAlgorithm>,
}

impl Variant {
    /// This is the name of the chip variant, unique within its family.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part number of the chip, if the descriptor gives one.
    pub fn part_number(&self) -> Option<&str> {
        self.part_number.as_deref()
    }

    /// The taps on the JTAG scan chain, in physical order.
    ///
    /// Empty for chips which are only accessed through SWD.
    pub fn scan_chain(&self) -> &[ScanChainEntry] {
        &self.scan_chain
    }

    /// The binary format to use when flashing, unless the user asks for another one.
    pub fn default_binary_format(&self) -> BinaryFormat {
        self.default_binary_format
    }

    /// The cores available on the chip.
    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    /// Looks up a core by name.
    pub fn core(&self, name: &str) -> Result<&Core, LookupError> {
        self.cores
            .iter()
            .find(|core| core.name == name)
            .ok_or_else(|| LookupError::CoreNotFound {
                variant: self.name.clone(),
                core: name.to_string(),
            })
    }

    /// The memory regions available on the chip, sorted by start address.
    pub fn memory_map(&self) -> &[MemoryRegion] {
        &self.memory_map
    }

    /// Iterates over the memory regions. Calling this again starts from the first region.
    pub fn memory_regions(&self) -> impl Iterator<Item = &MemoryRegion> + Clone + '_ {
        self.memory_map.iter()
    }

    /// The memory regions the given core can access, sorted by start address.
    pub fn memory_regions_of<'a>(
        &'a self,
        core_name: &str,
    ) -> impl Iterator<Item = &'a MemoryRegion> + 'a {
        self.core_regions
            .get(core_name)
            .into_iter()
            .flatten()
            .map(|&index| &self.memory_map[index])
    }

    /// The region marked as boot memory for the given core, if any.
    pub fn boot_memory(&self, core_name: &str) -> Option<&MemoryRegion> {
        self.memory_regions_of(core_name)
            .find(|region| region.is_boot_memory())
    }

    /// The flash algorithms available for this chip.
    pub fn flash_algorithms(&self) -> &[FlashAlgorithm] {
        &self.flash_algorithms
    }

    /// Try to find a [`FlashAlgorithm`] with a given name.
    pub fn flash_algorithm(&self, name: &str) -> Result<&FlashAlgorithm, LookupError> {
        self.flash_algorithms
            .iter()
            .find(|algorithm| algorithm.name == name)
            .ok_or_else(|| LookupError::FlashAlgorithmNotFound {
                variant: self.name.clone(),
                algorithm: name.to_string(),
            })
    }

    /// The algorithm marked as default, or the first one if none is marked.
    pub fn default_flash_algorithm(&self) -> Option<&FlashAlgorithm> {
        self.flash_algorithms
            .iter()
            .find(|algorithm| algorithm.default)
            .or_else(|| self.flash_algorithms.first())
    }
}

/// An individual core inside a chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Core {
    pub(crate) name: String,
    pub(crate) core_type: CoreType,
    pub(crate) access_options: CoreAccessOptions,
}

impl Core {
    /// The core name, unique within its variant.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The core type.
    /// E.g. `armv7em` or `xtensa`.
    pub fn core_type(&self) -> CoreType {
        self.core_type
    }

    /// The architecture of the core. Always agrees with [`Core::access_options`].
    pub fn architecture(&self) -> Architecture {
        self.core_type.architecture()
    }

    /// The data required to access the core.
    pub fn access_options(&self) -> &CoreAccessOptions {
        &self.access_options
    }
}

/// The data required to access a core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreAccessOptions {
    /// Arm specific options
    Arm(ArmCoreAccessOptions),
    /// Riscv specific options
    Riscv(RiscvCoreAccessOptions),
    /// Xtensa specific options
    Xtensa(XtensaCoreAccessOptions),
}

impl CoreAccessOptions {
    /// The architecture these options are meant for.
    pub fn architecture(&self) -> Architecture {
        match self {
            CoreAccessOptions::Arm(_) => Architecture::Arm,
            CoreAccessOptions::Riscv(_) => Architecture::Riscv,
            CoreAccessOptions::Xtensa(_) => Architecture::Xtensa,
        }
    }
}

/// The data required to access an ARM core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ArmCoreAccessOptions {
    /// The access port number to access the core
    #[serde(default)]
    pub ap: u8,
    /// The port select number to access the core
    #[serde(default)]
    pub psel: u32,
    /// The base address of the debug registers for the core.
    /// Required for Cortex-A, optional for Cortex-M
    #[serde(
        default,
        serialize_with = "hex_option::serialize",
        deserialize_with = "hex_option::deserialize"
    )]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub debug_base: Option<u64>,
    /// The base address of the cross trigger interface (CTI) for the core.
    /// Required in ARMv8-A
    #[serde(
        default,
        serialize_with = "hex_option::serialize",
        deserialize_with = "hex_option::deserialize"
    )]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub cti_base: Option<u64>,
}

/// The data required to access a Risc-V core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RiscvCoreAccessOptions {
    /// The hart id
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub hart_id: Option<u32>,

    /// The JTAG TAP index of the core's debug module
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub jtag_tap: Option<usize>,
}

/// The data required to access an Xtensa core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct XtensaCoreAccessOptions {
    /// The JTAG TAP index of the core's debug module
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub jtag_tap: Option<usize>,
}

/// A tap on the JTAG scan chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanChainEntry {
    pub(crate) name: String,
    pub(crate) ir_len: u32,
}

impl ScanChainEntry {
    /// Name of the tap. Usually, but not necessarily, the name of a core.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Length of the tap's instruction register in bits. Never zero.
    pub fn instruction_register_length_bits(&self) -> u32 {
        self.ir_len
    }
}

/// The format of the images a chip is usually flashed with.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryFormat {
    /// Raw binary, written as-is starting at the boot memory.
    Raw,
    /// Intel HEX.
    Hex,
    /// ELF, the format produced by most embedded toolchains.
    #[default]
    Elf,
    /// UF2 as used by USB mass storage bootloaders.
    Uf2,
    /// Espressif's esp-idf application image.
    Idf,
}
