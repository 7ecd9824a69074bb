//! Address and scan chain queries against a loaded [`Variant`].

use crate::chip::Variant;
use crate::error::LookupError;
use crate::memory::MemoryRegion;

/// Position of a tap's instruction register on the JTAG scan chain.
///
/// Bit offsets count from the first tap in declaration order, which is the tap closest to TDI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScanChainOffset {
    /// Index of the tap on the scan chain.
    pub index: usize,
    /// Sum of the IR lengths of all taps before this one.
    pub ir_offset_bits: u64,
    /// IR length of this tap.
    pub ir_length_bits: u32,
    /// Sum of the IR lengths of all taps on the chain.
    pub total_ir_length_bits: u64,
}

impl ScanChainOffset {
    /// Number of IR bits belonging to taps after this one, which have to be shifted as BYPASS.
    pub fn ir_bits_after(&self) -> u64 {
        self.total_ir_length_bits - self.ir_offset_bits - u64::from(self.ir_length_bits)
    }
}

impl Variant {
    /// Finds the memory region containing `address`, as seen by the core `core_name`.
    ///
    /// Only regions assigned to the core are considered. Since regions of one core never overlap,
    /// at most one region can match.
    pub fn resolve_address(
        &self,
        core_name: &str,
        address: u32,
    ) -> Result<&MemoryRegion, LookupError> {
        self.core(core_name)?;

        let owned = self
            .core_regions
            .get(core_name)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // `owned` is sorted by start address, find the last region starting at or before `address`.
        let candidates =
            owned.partition_point(|&index| self.memory_map[index].range.start() <= address);
        let region = candidates
            .checked_sub(1)
            .map(|position| &self.memory_map[owned[position]])
            .filter(|region| region.contains(address));

        match region {
            Some(region) => {
                tracing::trace!("{address:#010x} on core {core_name} resolves to {region}");
                Ok(region)
            }
            None => {
                tracing::trace!("{address:#010x} is not mapped for core {core_name}");
                Err(LookupError::AddressNotMapped {
                    core: core_name.to_string(),
                    address,
                })
            }
        }
    }

    /// Finds the position of the instruction register of the scan chain entry called `name`.
    ///
    /// Scan chain entries are usually, but not necessarily, named after cores, so `name` does not
    /// have to be a declared core. If a name appears more than once, the first entry is used.
    pub fn resolve_scan_position(&self, name: &str) -> Result<ScanChainOffset, LookupError> {
        let total_ir_length_bits = self
            .scan_chain
            .iter()
            .map(|entry| u64::from(entry.ir_len))
            .sum();

        let mut ir_offset_bits = 0;
        for (index, entry) in self.scan_chain.iter().enumerate() {
            if entry.name == name {
                return Ok(ScanChainOffset {
                    index,
                    ir_offset_bits,
                    ir_length_bits: entry.ir_len,
                    total_ir_length_bits,
                });
            }
            ir_offset_bits += u64::from(entry.ir_len);
        }

        Err(LookupError::NotInScanChain {
            variant: self.name.clone(),
            name: name.to_string(),
        })
    }
}
