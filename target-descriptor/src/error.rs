//! Errors reported while loading a target description, and the negative answers of lookups.

use crate::chip_family::{Architecture, CoreType};
use std::fmt;

/// The location of a field inside a target description, e.g. `variants[0].memory_map[2].cores[1]`.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

#[derive(Clone, PartialEq, Eq, Hash)]
enum PathSegment {
    Field(&'static str),
    Index(usize),
}

impl FieldPath {
    /// The path of the document itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns this path extended by a named field.
    pub fn field(&self, name: &'static str) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Field(name));
        path
    }

    /// Returns this path extended by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.0.push(PathSegment::Index(index));
        path
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }

        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if position == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }

        Ok(())
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldPath({self})")
    }
}

/// A target description violates one of the structural rules checked by
/// [`TargetFamily::load`](crate::TargetFamily::load).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at `{path}`{})", variant_context(.variant))]
pub struct ValidationError {
    /// Name of the offending variant, if the problem is inside a variant.
    pub variant: Option<String>,
    /// Where in the document the problem is.
    pub path: FieldPath,
    /// What is wrong.
    pub kind: ValidationErrorKind,
}

fn variant_context(variant: &Option<String>) -> String {
    match variant {
        Some(name) => format!(" in variant `{name}`"),
        None => String::new(),
    }
}

impl ValidationError {
    pub(crate) fn family(path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self {
            variant: None,
            path,
            kind,
        }
    }

    pub(crate) fn variant(variant: &str, path: FieldPath, kind: ValidationErrorKind) -> Self {
        Self {
            variant: Some(variant.to_string()),
            path,
            kind,
        }
    }
}

/// The individual rules a target description can violate.
#[derive(Debug, Clone, PartialEq, Eq, docsplay::Display)]
pub enum ValidationErrorKind {
    /// The JEP106 manufacturer code is missing
    MissingManufacturer,

    /// The JEP106 {field} of the manufacturer is missing
    MissingManufacturerField {
        /// The missing field.
        field: &'static str,
    },

    /// The JEP106 {field} {value:#x} does not fit in 7 bits
    ManufacturerOutOfRange {
        /// The offending field.
        field: &'static str,
        /// The value given in the description.
        value: u32,
    },

    /// Variant `{name}` appears multiple times
    DuplicateVariant {
        /// The repeated variant name.
        name: String,
    },

    /// Core `{name}` appears multiple times
    DuplicateCore {
        /// The repeated core name.
        name: String,
    },

    /// Scan chain entry `{name}` has no instruction register length
    MissingIrLength {
        /// Name of the scan chain entry.
        name: String,
    },

    /// Scan chain entry `{name}` has an instruction register length of zero
    ZeroIrLength {
        /// Name of the scan chain entry.
        name: String,
    },

    /// {region} is empty or inverted
    EmptyRange {
        /// Description of the region.
        region: String,
    },

    /// {region} is assigned to a non-existent core `{core}`
    UnknownCore {
        /// Description of the region.
        region: String,
        /// The undeclared core name.
        core: String,
    },

    /// {second} overlaps {first}, both are accessible by core `{core}`
    OverlappingRegions {
        /// The region declared first.
        first: String,
        /// The region declared later.
        second: String,
        /// A core owning both regions.
        core: String,
    },

    /// {options:?} options don't match core type {core_type:?} on core `{core}`
    ArchitectureMismatch {
        /// The core name.
        core: String,
        /// The declared core type.
        core_type: CoreType,
        /// The architecture of the given access options.
        options: Architecture,
    },

    /// Core `{core}` of type {core_type:?} requires setting {field}
    MissingAccessOption {
        /// The core name.
        core: String,
        /// The declared core type.
        core_type: CoreType,
        /// The option that is required for this core type.
        field: &'static str,
    },

    /// Flash algorithm `{name}` appears multiple times
    DuplicateFlashAlgorithm {
        /// The repeated algorithm name.
        name: String,
    },

    /// Flash algorithm `{algorithm}` is assigned to a non-existent core `{core}`
    FlashAlgorithmUnknownCore {
        /// The algorithm name.
        algorithm: String,
        /// The undeclared core name.
        core: String,
    },

    /// Core `{core}` has no entry in the scan chain
    CoreNotInScanChain {
        /// The core name.
        core: String,
    },
}

/// A lookup in a loaded target description found nothing.
///
/// These are ordinary answers to legitimate questions, e.g. whether an address can be accessed
/// at all, and not failures of the description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, docsplay::Display)]
pub enum LookupError {
    /// Variant `{0}` is not part of this target family.
    VariantNotFound(String),

    /// Core `{core}` is not declared by variant `{variant}`.
    CoreNotFound {
        /// The variant that was searched.
        variant: String,
        /// The requested core.
        core: String,
    },

    /// Address {address:#010x} is not mapped for core `{core}`.
    AddressNotMapped {
        /// The requested core.
        core: String,
        /// The requested address.
        address: u32,
    },

    /// `{name}` has no entry in the scan chain of variant `{variant}`.
    NotInScanChain {
        /// The variant that was searched.
        variant: String,
        /// The requested scan chain entry.
        name: String,
    },

    /// Flash algorithm `{algorithm}` is not available for variant `{variant}`.
    FlashAlgorithmNotFound {
        /// The variant that was searched.
        variant: String,
        /// The requested algorithm.
        algorithm: String,
    },
}

/// Errors of the convenience loaders which also run the deserializer.
#[derive(Debug, thiserror::Error, docsplay::Display)]
pub enum DescriptorError {
    /// The target description could not be deserialized.
    Deserialize(#[from] serde_yaml::Error),

    /// The target description is invalid: {0}
    Validation(#[from] ValidationError),
}
