use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Declares the type of a memory region.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemoryKind {
    /// Memory region describing flash, EEPROM or other non-volatile memory.
    Nvm,
    /// Memory region describing RAM.
    Ram,
    /// Generic memory region, which is neither
    /// flash nor RAM.
    Generic,
}

impl MemoryKind {
    /// Returns `true` if writes to this kind of memory have to go through a flash algorithm
    /// instead of plain memory writes.
    pub fn requires_flash_algorithm(&self) -> bool {
        matches!(self, MemoryKind::Nvm)
    }
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryKind::Nvm => "NVM",
            MemoryKind::Ram => "RAM",
            MemoryKind::Generic => "generic",
        };
        f.write_str(name)
    }
}

/// A half-open address range `[start, end)`.
///
/// Ranges handed out by a loaded [`Variant`](crate::Variant) are never empty.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct AddressRange {
    start: u32,
    end: u32,
}

impl AddressRange {
    /// Creates a new range, or returns `None` unless `start < end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// The first address in the range.
    pub fn start(&self) -> u32 {
        self.start
    }

    /// The first address past the range.
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Size of the range in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Always `false`, see [`AddressRange::new`].
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns whether `address` lies inside the range.
    pub fn contains(&self, address: u32) -> bool {
        self.start <= address && address < self.end
    }

    /// Returns true if `self` contains `other` fully.
    pub fn contains_range(&self, other: &AddressRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns true if the two ranges share at least one address.
    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start.max(other.start) < self.end.min(other.end)
    }
}

impl fmt::Debug for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}..{:#010x}", self.start, self.end)
    }
}

impl From<AddressRange> for Range<u32> {
    fn from(range: AddressRange) -> Self {
        range.start..range.end
    }
}

fn default_true() -> bool {
    true
}

/// Represents access permissions of a memory region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryAccess {
    /// True if the region is readable.
    #[serde(default = "default_true")]
    pub read: bool,
    /// True if the region is writable.
    #[serde(default = "default_true")]
    pub write: bool,
    /// True if the region is executable.
    #[serde(default = "default_true")]
    pub execute: bool,
}

impl Default for MemoryAccess {
    fn default() -> Self {
        MemoryAccess {
            read: true,
            write: true,
            execute: true,
        }
    }
}

/// A validated region of the memory map of a [`Variant`](crate::Variant).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryRegion {
    pub(crate) kind: MemoryKind,
    pub(crate) name: Option<String>,
    pub(crate) range: AddressRange,
    pub(crate) is_boot_memory: bool,
    pub(crate) is_alias: bool,
    pub(crate) access: MemoryAccess,
    pub(crate) owning_cores: Vec<String>,
}

impl MemoryRegion {
    /// The kind of memory, which decides how the region may be written.
    pub fn kind(&self) -> MemoryKind {
        self.kind
    }

    /// A name to describe the region, if the descriptor gives one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Address range of the region.
    pub fn range(&self) -> AddressRange {
        self.range
    }

    /// Returns whether the memory region contains the given address.
    pub fn contains(&self, address: u32) -> bool {
        self.range.contains(address)
    }

    /// True if the chip boots from this memory.
    pub fn is_boot_memory(&self) -> bool {
        self.is_boot_memory
    }

    /// True if the memory region is a bus-relative view of memory that is also mapped elsewhere.
    pub fn is_alias(&self) -> bool {
        self.is_alias
    }

    /// Returns the access permissions for the region.
    pub fn access(&self) -> MemoryAccess {
        self.access
    }

    /// Names of the cores that can access this region.
    ///
    /// An empty list means no core-scoped query will ever match the region.
    pub fn owning_cores(&self) -> &[String] {
        &self.owning_cores
    }

    /// Returns whether the region is accessible by the given core.
    pub fn accessible_by(&self, core_name: &str) -> bool {
        self.owning_cores.iter().any(|c| c == core_name)
    }

    /// Returns `true` if the memory region is RAM.
    #[must_use]
    pub fn is_ram(&self) -> bool {
        self.kind == MemoryKind::Ram
    }

    /// Returns `true` if the memory region is non-volatile memory.
    #[must_use]
    pub fn is_nvm(&self) -> bool {
        self.kind == MemoryKind::Nvm
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        region_label(f, self.kind, self.name.as_deref(), self.range.start, self.range.end)
    }
}

/// Formats a region the way diagnostics refer to it, e.g. `RAM region "dram" [0x3fc88000, 0x3fcf0000)`.
pub(crate) fn region_label(
    f: &mut impl fmt::Write,
    kind: MemoryKind,
    name: Option<&str>,
    start: u32,
    end: u32,
) -> fmt::Result {
    write!(f, "{kind} region ")?;
    if let Some(name) = name {
        write!(f, "{name:?} ")?;
    }
    write!(f, "[{start:#010x}, {end:#010x})")
}

#[cfg(test)]
mod test {
    use super::*;

    fn range(start: u32, end: u32) -> AddressRange {
        AddressRange::new(start, end).unwrap()
    }

    #[test]
    fn empty_and_inverted_ranges_are_rejected() {
        assert_eq!(AddressRange::new(4, 4), None);
        assert_eq!(AddressRange::new(8, 4), None);
        assert_eq!(range(0, 1).len(), 1);
    }

    #[test]
    fn contains_is_half_open() {
        let r = range(0x1000, 0x2000);
        assert!(r.contains(0x1000));
        assert!(r.contains(0x1fff));
        assert!(!r.contains(0x2000));
        assert!(!r.contains(0x0fff));
    }

    #[test]
    fn contains_range1() {
        assert!(range(0, 1).contains_range(&range(0, 1)));
    }

    #[test]
    fn contains_range2() {
        assert!(!range(0, 1).contains_range(&range(0, 2)));
    }

    #[test]
    fn contains_range3() {
        assert!(!range(4, 8).contains_range(&range(3, 9)));
    }

    #[test]
    fn contains_range4() {
        assert!(range(4, 8).contains_range(&range(6, 8)));
    }

    #[test]
    fn overlaps1() {
        assert!(range(0, 1).overlaps(&range(0, 1)));
    }

    #[test]
    fn overlaps2() {
        assert!(range(4, 8).overlaps(&range(3, 9)));
    }

    #[test]
    fn overlaps3() {
        // Adjacent half-open ranges share no address.
        assert!(!range(4, 8).overlaps(&range(3, 4)));
        assert!(!range(8, 9).overlaps(&range(6, 8)));
    }

    #[test]
    fn overlaps4() {
        assert!(!range(2, 4).overlaps(&range(6, 8)));
    }

    #[test]
    fn overlaps_by_a_single_address() {
        assert!(range(0, 0x101).overlaps(&range(0x100, 0x200)));
    }

    #[test]
    fn region_label_includes_name_when_present() {
        let mut named = String::new();
        region_label(&mut named, MemoryKind::Ram, Some("dram"), 0x3fc8_8000, 0x3fcf_0000).unwrap();
        assert_eq!(named, r#"RAM region "dram" [0x3fc88000, 0x3fcf0000)"#);

        let mut anonymous = String::new();
        region_label(&mut anonymous, MemoryKind::Nvm, None, 0, 0x1000).unwrap();
        assert_eq!(anonymous, "NVM region [0x00000000, 0x00001000)");
    }
}
