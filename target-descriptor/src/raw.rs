//! The document schema of a target description.
//!
//! These structs are what a deserializer produces from a target description file. They are
//! deliberately permissive: anything that is syntactically well-formed is accepted here, and the
//! structural rules are enforced by [`TargetFamily::load`](crate::TargetFamily::load), which
//! reports violations with a field path instead of a parser position.
//!
//! A description in YAML looks like this:
//!
//! ```yaml
//! name: esp32s3
//! manufacturer:
//!   id: 0x12
//!   cc: 0x0c
//! variants:
//! - name: esp32s3
//!   cores:
//!   - name: main
//!     type: xtensa
//!     core_access_options: !Xtensa {}
//!   memory_map:
//!   - !Ram
//!     range:
//!       start: 0x3fc88000
//!       end: 0x3fcf0000
//!     cores:
//!     - main
//!   jtag:
//!     scan_chain:
//!     - name: main
//!       ir_len: 5
//!   default_binary_format: idf
//! ```

use crate::chip::{BinaryFormat, CoreAccessOptions, Variant};
use crate::chip_family::{CoreType, TargetFamily};
use crate::flash_algorithm::FlashAlgorithm;
use crate::memory::{MemoryAccess, MemoryKind, MemoryRegion};
use crate::serialize::{hex_option, hex_range};

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A chip family as written in a target description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTargetFamily {
    /// This is the name of the chip family in base form.
    pub name: String,
    /// The JEP106 code of the manufacturer.
    #[serde(default)]
    pub manufacturer: Option<RawManufacturer>,
    /// This vector holds all the variants of the family.
    #[serde(default)]
    pub variants: Vec<RawVariant>,
}

/// A JEP106 code as written in a target description.
///
/// The fields are wider than the final code so out-of-range values reach the validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawManufacturer {
    /// JEP106 identification code.
    #[serde(
        default,
        serialize_with = "hex_option::serialize",
        deserialize_with = "hex_option::deserialize"
    )]
    pub id: Option<u32>,
    /// JEP106 continuation code.
    #[serde(
        default,
        serialize_with = "hex_option::serialize",
        deserialize_with = "hex_option::deserialize"
    )]
    pub cc: Option<u32>,
}

/// A single chip variant as written in a target description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawVariant {
    /// This is the name of the chip variant.
    pub name: String,
    /// The part number of the chip.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub part_number: Option<String>,
    /// The cores available on the chip.
    #[serde(default)]
    pub cores: Vec<RawCore>,
    /// The memory regions available on the chip.
    #[serde(default)]
    pub memory_map: Vec<RawMemoryRegion>,
    /// The flash algorithms available for this chip.
    #[serde(default)]
    #[cfg_attr(not(feature = "bincode"), serde(skip_serializing_if = "Vec::is_empty"))]
    pub flash_algorithms: Vec<FlashAlgorithm>,
    /// JTAG-specific options.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub jtag: Option<RawJtag>,
    /// The default binary format for this chip.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub default_binary_format: Option<BinaryFormat>,
}

/// JTAG-specific options of a variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJtag {
    /// The taps on the scan chain, in physical order.
    #[serde(default)]
    pub scan_chain: Vec<RawScanChainElement>,
}

/// A tap on the scan chain as written in a target description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawScanChainElement {
    /// Name of the tap.
    pub name: String,
    /// Length of the instruction register in bits.
    #[serde(default)]
    pub ir_len: Option<u32>,
}

/// An individual core as written in a target description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCore {
    /// The core name.
    pub name: String,
    /// The core type.
    #[serde(rename = "type")]
    pub core_type: CoreType,
    /// The data required to access the core.
    pub core_access_options: CoreAccessOptions,
}

/// A memory region as written in a target description, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawMemoryRegion {
    /// Memory region describing RAM.
    Ram(RawRegion),
    /// Generic memory region, which is neither
    /// flash nor RAM.
    Generic(RawRegion),
    /// Memory region describing flash, EEPROM or other non-volatile memory.
    #[serde(alias = "Flash")] // Keeping the "Flash" name for backwards compatibility
    Nvm(RawRegion),
}

impl RawMemoryRegion {
    /// The kind of the region, as given by its tag.
    pub fn kind(&self) -> MemoryKind {
        match self {
            RawMemoryRegion::Ram(_) => MemoryKind::Ram,
            RawMemoryRegion::Generic(_) => MemoryKind::Generic,
            RawMemoryRegion::Nvm(_) => MemoryKind::Nvm,
        }
    }

    /// The region description, independent of its kind.
    pub fn region(&self) -> &RawRegion {
        match self {
            RawMemoryRegion::Ram(region)
            | RawMemoryRegion::Generic(region)
            | RawMemoryRegion::Nvm(region) => region,
        }
    }

    fn with_kind(kind: MemoryKind, region: RawRegion) -> Self {
        match kind {
            MemoryKind::Ram => RawMemoryRegion::Ram(region),
            MemoryKind::Generic => RawMemoryRegion::Generic(region),
            MemoryKind::Nvm => RawMemoryRegion::Nvm(region),
        }
    }

    /// Describes the region for diagnostics.
    pub(crate) fn label(&self) -> String {
        let region = self.region();
        let mut label = String::new();
        // Writing into a `String` cannot fail.
        let _ = crate::memory::region_label(
            &mut label,
            self.kind(),
            region.name.as_deref(),
            region.range.start,
            region.range.end,
        );
        label
    }
}

/// The fields shared by all kinds of memory regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRegion {
    /// A name to describe the region
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub name: Option<String>,
    /// Address range of the region
    #[serde(with = "hex_range")]
    pub range: Range<u32>,
    /// List of cores that can access this region
    #[serde(default)]
    pub cores: Vec<String>,
    /// True if the chip boots from this memory
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "std::ops::Not::not")
    )]
    pub is_boot_memory: bool,
    /// True if the memory region is an alias of a different memory region.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "std::ops::Not::not")
    )]
    pub is_alias: bool,
    /// Access permissions for the region.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub access: Option<MemoryAccess>,
}

impl From<&TargetFamily> for RawTargetFamily {
    fn from(family: &TargetFamily) -> Self {
        RawTargetFamily {
            name: family.name.clone(),
            manufacturer: Some(RawManufacturer {
                id: Some(u32::from(family.manufacturer.id())),
                cc: Some(u32::from(family.manufacturer.continuation_code())),
            }),
            variants: family.variants.iter().map(RawVariant::from).collect(),
        }
    }
}

impl From<&Variant> for RawVariant {
    fn from(variant: &Variant) -> Self {
        let jtag = (!variant.scan_chain.is_empty()).then(|| RawJtag {
            scan_chain: variant
                .scan_chain
                .iter()
                .map(|entry| RawScanChainElement {
                    name: entry.name.clone(),
                    ir_len: Some(entry.ir_len),
                })
                .collect(),
        });

        RawVariant {
            name: variant.name.clone(),
            part_number: variant.part_number.clone(),
            cores: variant
                .cores
                .iter()
                .map(|core| RawCore {
                    name: core.name.clone(),
                    core_type: core.core_type,
                    core_access_options: core.access_options.clone(),
                })
                .collect(),
            memory_map: variant.memory_map.iter().map(RawMemoryRegion::from).collect(),
            flash_algorithms: variant.flash_algorithms.clone(),
            jtag,
            default_binary_format: Some(variant.default_binary_format),
        }
    }
}

impl From<&MemoryRegion> for RawMemoryRegion {
    fn from(region: &MemoryRegion) -> Self {
        let access = (region.access != MemoryAccess::default()).then_some(region.access);

        RawMemoryRegion::with_kind(
            region.kind,
            RawRegion {
                name: region.name.clone(),
                range: region.range.into(),
                cores: region.owning_cores.clone(),
                is_boot_memory: region.is_boot_memory,
                is_alias: region.is_alias,
                access,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn flash_tag_is_an_alias_of_nvm() {
        let yaml = "
- !Flash
  range:
    start: 0x0
    end: 0x1000
  cores: [main]
- !Nvm
  range:
    start: 0x1000
    end: 0x2000
";
        let regions: Vec<RawMemoryRegion> = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(regions[0].kind(), MemoryKind::Nvm);
        assert_eq!(regions[1].kind(), MemoryKind::Nvm);
        assert_eq!(regions[0].region().cores, vec!["main".to_string()]);
        assert!(regions[1].region().cores.is_empty());
    }

    #[test]
    fn inverted_ranges_survive_deserialization() {
        let yaml = "
!Ram
range:
  start: 0x2000
  end: 0x1000
";
        let region: RawMemoryRegion = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(region.region().range, 0x2000..0x1000);
        assert_eq!(region.label(), "RAM region [0x00002000, 0x00001000)");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "
name: broken
ir_len: 5
tap_index: 2
";
        assert!(serde_yaml::from_str::<RawScanChainElement>(yaml).is_err());
    }

    #[test]
    fn missing_ir_len_is_left_to_validation() {
        let element: RawScanChainElement = serde_yaml::from_str("name: main").unwrap();
        assert_eq!(element.ir_len, None);
    }
}
