//! Target description schema
//!
//! For debugging and flashing different chips, called *target* here, some target specific
//! configuration is required: the cores of the chip and how to reach them on the JTAG scan chain,
//! the memory map, and the JEP106 code of the manufacturer.
//!
//! This crate contains the schema structs for target description files ([`raw`]), the validating
//! loader that turns such a description into an immutable [`TargetFamily`], and the queries a
//! debug or flash tool runs against it:
//!
//! * [`Variant::resolve_address`]: which memory region contains an address, for a given core,
//! * [`Variant::resolve_scan_position`]: where a core's instruction register sits on the scan chain.
//!
//! ```
//! use target_descriptor::{MemoryKind, TargetFamily};
//!
//! let family = TargetFamily::from_yaml_str(
//!     r#"
//! name: example
//! manufacturer:
//!   id: 0x12
//!   cc: 0x0c
//! variants:
//! - name: example
//!   cores:
//!   - name: main
//!     type: xtensa
//!     core_access_options: !Xtensa {}
//!   memory_map:
//!   - !Ram
//!     range:
//!       start: 0x3fc88000
//!       end: 0x3fcf0000
//!     cores: [main]
//!   jtag:
//!     scan_chain:
//!     - name: main
//!       ir_len: 5
//! "#,
//! )?;
//!
//! let variant = family.variant("example")?;
//! let region = variant.resolve_address("main", 0x3fc9_0000)?;
//! assert_eq!(region.kind(), MemoryKind::Ram);
//! assert_eq!(variant.resolve_scan_position("main")?.ir_offset_bits, 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![warn(missing_docs)]

mod chip;
mod chip_family;
mod error;
mod flash_algorithm;
mod memory;
pub mod raw;
mod resolve;
pub(crate) mod serialize;
mod validate;

pub use chip::{
    ArmCoreAccessOptions, BinaryFormat, Core, CoreAccessOptions, RiscvCoreAccessOptions,
    ScanChainEntry, Variant, XtensaCoreAccessOptions,
};
pub use chip_family::{Architecture, CoreType, Manufacturer, TargetDescriptionSource, TargetFamily};
pub use error::{DescriptorError, FieldPath, LookupError, ValidationError, ValidationErrorKind};
pub use flash_algorithm::FlashAlgorithm;
pub use memory::{AddressRange, MemoryAccess, MemoryKind, MemoryRegion};
pub use resolve::ScanChainOffset;
pub use validate::{LoadOptions, ScanChainPolicy};
