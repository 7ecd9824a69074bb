//! Loading of target descriptions.
//!
//! [`TargetFamily::load`] turns an untrusted [`RawTargetFamily`] into a [`TargetFamily`]. The
//! checks run in a fixed order over the whole family and the first violation is returned:
//!
//! 1. the manufacturer code is present and both fields fit in 7 bits,
//! 2. variant names are unique within the family,
//! 3. core names are unique within each variant,
//! 4. every scan chain entry has a non-zero instruction register length,
//! 5. every memory region has `start < end`,
//! 6. every core a memory region is assigned to is declared,
//! 7. no two regions sharing a core overlap,
//! 8. the core access options match the core architecture,
//! 9. flash algorithm names are unique and their cores are declared,
//! 10. with [`ScanChainPolicy::RequireCoreNames`], every core has a scan chain entry.
//!
//! Overlap is decided per declared address. Bus aliases, where the same physical memory shows up
//! at an instruction bus and a data bus address, are separate address ranges and never conflict.

use crate::chip::{Core, CoreAccessOptions, ScanChainEntry, Variant};
use crate::chip_family::{CoreType, Manufacturer, TargetDescriptionSource, TargetFamily};
use crate::error::{DescriptorError, FieldPath, ValidationError, ValidationErrorKind};
use crate::memory::{AddressRange, MemoryRegion};
use crate::raw::{RawManufacturer, RawMemoryRegion, RawTargetFamily, RawVariant};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// How scan chain entries relate to the cores of a variant.
///
/// Scan chain entries are usually named after the core whose debug module sits behind the tap,
/// but a chain may also contain taps that are not cores at all.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanChainPolicy {
    /// Scan chain entries are independent of the cores.
    #[default]
    Decoupled,
    /// When a variant declares a scan chain, every core must have an entry with its name.
    RequireCoreNames,
}

/// Options for [`TargetFamily::load_with`].
///
/// Can be embedded in the configuration file of a tool; missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// How scan chain entries relate to the cores.
    pub scan_chain_policy: ScanChainPolicy,
    /// Where the description came from, kept on the loaded family for diagnostics.
    pub source: TargetDescriptionSource,
}

impl TargetFamily {
    /// Validates a raw target description with the default [`LoadOptions`].
    pub fn load(raw: RawTargetFamily) -> Result<Self, ValidationError> {
        Self::load_with(raw, &LoadOptions::default())
    }

    /// Validates a raw target description.
    ///
    /// Either the whole description is valid and an immutable family is returned, or the first
    /// violation is reported. Nothing is repaired.
    pub fn load_with(raw: RawTargetFamily, options: &LoadOptions) -> Result<Self, ValidationError> {
        match Loader::new(&raw, options).check() {
            Ok(manufacturer) => {
                let family = build_family(raw, manufacturer, options.source);
                tracing::debug!(
                    "Loaded target family {} with {} variant(s) from {:?} source",
                    family.name,
                    family.variants.len(),
                    family.source
                );
                Ok(family)
            }
            Err(error) => {
                tracing::warn!("Rejected target family {}: {}", raw.name, error);
                Err(error)
            }
        }
    }

    /// Deserializes a YAML document and validates it with the default [`LoadOptions`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DescriptorError> {
        let raw: RawTargetFamily = serde_yaml::from_str(yaml)?;
        Ok(Self::load(raw)?)
    }

    /// Validates an already parsed YAML tree.
    pub fn from_yaml_value(
        value: serde_yaml::Value,
        options: &LoadOptions,
    ) -> Result<Self, DescriptorError> {
        let raw: RawTargetFamily = serde_yaml::from_value(value)?;
        Ok(Self::load_with(raw, options)?)
    }
}

struct Loader<'a> {
    raw: &'a RawTargetFamily,
    options: &'a LoadOptions,
}

impl<'a> Loader<'a> {
    fn new(raw: &'a RawTargetFamily, options: &'a LoadOptions) -> Self {
        Self { raw, options }
    }

    fn check(&self) -> Result<Manufacturer, ValidationError> {
        let manufacturer = self.check_manufacturer()?;
        self.reject_duplicate_variant_names()?;
        self.reject_duplicate_core_names()?;
        self.check_scan_chain_lengths()?;
        self.reject_empty_ranges()?;
        self.check_region_owners()?;
        self.reject_overlapping_regions()?;
        self.reject_incorrect_core_access_options()?;
        self.check_flash_algorithms()?;
        self.check_scan_chain_names()?;

        Ok(manufacturer)
    }

    fn variants(&self) -> impl Iterator<Item = (&'a RawVariant, FieldPath)> {
        let base = FieldPath::root().field("variants");
        self.raw
            .variants
            .iter()
            .enumerate()
            .map(move |(index, variant)| (variant, base.index(index)))
    }

    fn check_manufacturer(&self) -> Result<Manufacturer, ValidationError> {
        let path = FieldPath::root().field("manufacturer");
        let Some(RawManufacturer { id, cc }) = &self.raw.manufacturer else {
            return Err(ValidationError::family(
                path,
                ValidationErrorKind::MissingManufacturer,
            ));
        };

        let field = |value: Option<u32>, name: &'static str| {
            let value = value.ok_or_else(|| {
                ValidationError::family(
                    path.field(name),
                    ValidationErrorKind::MissingManufacturerField { field: name },
                )
            })?;

            u8::try_from(value)
                .ok()
                .filter(|value| *value <= Manufacturer::MAX_CODE)
                .ok_or_else(|| {
                    ValidationError::family(
                        path.field(name),
                        ValidationErrorKind::ManufacturerOutOfRange { field: name, value },
                    )
                })
        };

        let cc = field(*cc, "cc")?;
        let id = field(*id, "id")?;

        // Both fields were range checked above.
        Manufacturer::new(cc, id).ok_or_else(|| {
            ValidationError::family(
                path,
                ValidationErrorKind::ManufacturerOutOfRange {
                    field: "cc",
                    value: u32::from(cc),
                },
            )
        })
    }

    /// Rejects target descriptions with duplicate target names. Only one of these targets can
    /// be selected, so having multiple is probably a mistake.
    fn reject_duplicate_variant_names(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();

        for (variant, path) in self.variants() {
            if !seen.insert(variant.name.as_str()) {
                return Err(ValidationError::variant(
                    &variant.name,
                    path.field("name"),
                    ValidationErrorKind::DuplicateVariant {
                        name: variant.name.clone(),
                    },
                ));
            }
        }

        Ok(())
    }

    fn reject_duplicate_core_names(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let mut seen = HashSet::new();

            for (index, core) in variant.cores.iter().enumerate() {
                if !seen.insert(core.name.as_str()) {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path.field("cores").index(index).field("name"),
                        ValidationErrorKind::DuplicateCore {
                            name: core.name.clone(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_scan_chain_lengths(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let Some(jtag) = &variant.jtag else {
                continue;
            };

            for (index, element) in jtag.scan_chain.iter().enumerate() {
                let path = path
                    .field("jtag")
                    .field("scan_chain")
                    .index(index)
                    .field("ir_len");
                let name = element.name.clone();

                match element.ir_len {
                    None => {
                        return Err(ValidationError::variant(
                            &variant.name,
                            path,
                            ValidationErrorKind::MissingIrLength { name },
                        ))
                    }
                    Some(0) => {
                        return Err(ValidationError::variant(
                            &variant.name,
                            path,
                            ValidationErrorKind::ZeroIrLength { name },
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }

    fn reject_empty_ranges(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            for (index, region) in variant.memory_map.iter().enumerate() {
                let range = &region.region().range;
                if range.start >= range.end {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path.field("memory_map").index(index).field("range"),
                        ValidationErrorKind::EmptyRange {
                            region: region.label(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }

    /// Ensures that all the cores a memory region is assigned to exist.
    ///
    /// Regions without any core are accepted, they are just never found by core-scoped queries.
    fn check_region_owners(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let core_names = core_names(variant);

            for (index, region) in variant.memory_map.iter().enumerate() {
                let cores = &region.region().cores;
                if cores.is_empty() {
                    tracing::debug!(
                        "Variant {}: {} is not assigned to any core",
                        variant.name,
                        region.label()
                    );
                }

                for (core_index, core) in cores.iter().enumerate() {
                    if !core_names.contains(core.as_str()) {
                        return Err(ValidationError::variant(
                            &variant.name,
                            path.field("memory_map")
                                .index(index)
                                .field("cores")
                                .index(core_index),
                            ValidationErrorKind::UnknownCore {
                                region: region.label(),
                                core: core.clone(),
                            },
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn reject_overlapping_regions(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let regions = &variant.memory_map;

            for (second_index, second) in regions.iter().enumerate() {
                for first in &regions[..second_index] {
                    let (a, b) = (&first.region().range, &second.region().range);
                    if a.start.max(b.start) >= a.end.min(b.end) {
                        continue;
                    }

                    let shared_core = first
                        .region()
                        .cores
                        .iter()
                        .find(|core| second.region().cores.contains(core));

                    if let Some(core) = shared_core {
                        return Err(ValidationError::variant(
                            &variant.name,
                            path.field("memory_map").index(second_index).field("range"),
                            ValidationErrorKind::OverlappingRegions {
                                first: first.label(),
                                second: second.label(),
                                core: core.clone(),
                            },
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn reject_incorrect_core_access_options(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            for (index, core) in variant.cores.iter().enumerate() {
                let path = path.field("cores").index(index).field("core_access_options");
                let options = &core.core_access_options;

                // The core access options must match the core type specified
                if options.architecture() != core.core_type.architecture() {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path,
                        ValidationErrorKind::ArchitectureMismatch {
                            core: core.name.clone(),
                            core_type: core.core_type,
                            options: options.architecture(),
                        },
                    ));
                }

                if let CoreAccessOptions::Arm(arm) = options {
                    let missing = if matches!(core.core_type, CoreType::Armv7a | CoreType::Armv8a)
                        && arm.debug_base.is_none()
                    {
                        Some("debug_base")
                    } else if core.core_type == CoreType::Armv8a && arm.cti_base.is_none() {
                        Some("cti_base")
                    } else {
                        None
                    };

                    if let Some(field) = missing {
                        return Err(ValidationError::variant(
                            &variant.name,
                            path.field(field),
                            ValidationErrorKind::MissingAccessOption {
                                core: core.name.clone(),
                                core_type: core.core_type,
                                field,
                            },
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    fn check_flash_algorithms(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let core_names = core_names(variant);
            let mut seen = HashSet::new();

            for (index, algorithm) in variant.flash_algorithms.iter().enumerate() {
                let path = path.field("flash_algorithms").index(index);

                if !seen.insert(algorithm.name.as_str()) {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path.field("name"),
                        ValidationErrorKind::DuplicateFlashAlgorithm {
                            name: algorithm.name.clone(),
                        },
                    ));
                }

                if let Some((core_index, core)) = algorithm
                    .cores
                    .iter()
                    .enumerate()
                    .find(|(_, core)| !core_names.contains(core.as_str()))
                {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path.field("cores").index(core_index),
                        ValidationErrorKind::FlashAlgorithmUnknownCore {
                            algorithm: algorithm.name.clone(),
                            core: core.clone(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }

    fn check_scan_chain_names(&self) -> Result<(), ValidationError> {
        for (variant, path) in self.variants() {
            let Some(jtag) = variant.jtag.as_ref().filter(|jtag| !jtag.scan_chain.is_empty())
            else {
                continue;
            };

            let core_names = core_names(variant);
            for element in &jtag.scan_chain {
                if !core_names.contains(element.name.as_str()) {
                    tracing::debug!(
                        "Variant {}: scan chain entry {} does not belong to a core",
                        variant.name,
                        element.name
                    );
                }
            }

            if self.options.scan_chain_policy != ScanChainPolicy::RequireCoreNames {
                continue;
            }

            for (index, core) in variant.cores.iter().enumerate() {
                if !jtag.scan_chain.iter().any(|element| element.name == core.name) {
                    return Err(ValidationError::variant(
                        &variant.name,
                        path.field("cores").index(index).field("name"),
                        ValidationErrorKind::CoreNotInScanChain {
                            core: core.name.clone(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }
}

fn core_names(variant: &RawVariant) -> HashSet<&str> {
    variant.cores.iter().map(|core| core.name.as_str()).collect()
}

/// Converts a checked description into the model. Only called after [`Loader::check`] succeeded.
fn build_family(
    raw: RawTargetFamily,
    manufacturer: Manufacturer,
    source: TargetDescriptionSource,
) -> TargetFamily {
    TargetFamily {
        name: raw.name,
        manufacturer,
        variants: raw.variants.into_iter().map(build_variant).collect(),
        source,
    }
}

fn build_variant(raw: RawVariant) -> Variant {
    let scan_chain = raw
        .jtag
        .map(|jtag| jtag.scan_chain)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|element| {
            Some(ScanChainEntry {
                ir_len: element.ir_len?,
                name: element.name,
            })
        })
        .collect();

    let cores = raw
        .cores
        .into_iter()
        .map(|core| Core {
            name: core.name,
            core_type: core.core_type,
            access_options: core.core_access_options,
        })
        .collect();

    let mut memory_map = raw
        .memory_map
        .into_iter()
        .filter_map(build_region)
        .collect::<Vec<_>>();
    // Stable, so regions starting at the same address keep their declaration order.
    memory_map.sort_by_key(|region| region.range.start());

    let mut core_regions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (index, region) in memory_map.iter().enumerate() {
        for core in &region.owning_cores {
            core_regions.entry(core.clone()).or_default().push(index);
        }
    }

    Variant {
        name: raw.name,
        part_number: raw.part_number,
        scan_chain,
        default_binary_format: raw.default_binary_format.unwrap_or_default(),
        cores,
        memory_map,
        core_regions,
        flash_algorithms: raw.flash_algorithms,
    }
}

fn build_region(raw: RawMemoryRegion) -> Option<MemoryRegion> {
    let kind = raw.kind();
    let region = match raw {
        RawMemoryRegion::Ram(region)
        | RawMemoryRegion::Generic(region)
        | RawMemoryRegion::Nvm(region) => region,
    };

    Some(MemoryRegion {
        kind,
        name: region.name,
        range: AddressRange::new(region.range.start, region.range.end)?,
        is_boot_memory: region.is_boot_memory,
        is_alias: region.is_alias,
        access: region.access.unwrap_or_default(),
        owning_cores: region.cores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{ArmCoreAccessOptions, XtensaCoreAccessOptions};
    use crate::raw::{RawCore, RawJtag, RawRegion, RawScanChainElement};
    use crate::FlashAlgorithm;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn xtensa_core(name: &str) -> RawCore {
        RawCore {
            name: name.to_string(),
            core_type: CoreType::Xtensa,
            core_access_options: CoreAccessOptions::Xtensa(XtensaCoreAccessOptions::default()),
        }
    }

    fn region(start: u32, end: u32, cores: &[&str]) -> RawRegion {
        RawRegion {
            name: None,
            range: start..end,
            cores: cores.iter().map(|core| core.to_string()).collect(),
            is_boot_memory: false,
            is_alias: false,
            access: None,
        }
    }

    fn variant(name: &str) -> RawVariant {
        RawVariant {
            name: name.to_string(),
            part_number: None,
            cores: vec![xtensa_core("main")],
            memory_map: vec![
                RawMemoryRegion::Nvm(region(0x0, 0x400_0000, &["main"])),
                RawMemoryRegion::Ram(region(0x3fc8_8000, 0x3fcf_0000, &["main"])),
            ],
            flash_algorithms: vec![],
            jtag: Some(RawJtag {
                scan_chain: vec![
                    RawScanChainElement {
                        name: "main".to_string(),
                        ir_len: Some(5),
                    },
                    RawScanChainElement {
                        name: "app".to_string(),
                        ir_len: Some(5),
                    },
                ],
            }),
            default_binary_format: None,
        }
    }

    fn family() -> RawTargetFamily {
        RawTargetFamily {
            name: "test".to_string(),
            manufacturer: Some(RawManufacturer {
                id: Some(0x12),
                cc: Some(0x0c),
            }),
            variants: vec![variant("test")],
        }
    }

    fn load_kind(raw: RawTargetFamily) -> ValidationErrorKind {
        TargetFamily::load(raw).unwrap_err().kind
    }

    #[test]
    fn accepts_valid_family() {
        let family = TargetFamily::load(family()).unwrap();

        assert_eq!(family.manufacturer(), Manufacturer::new(0x0c, 0x12).unwrap());
        assert_eq!(family.variants().len(), 1);
        assert_eq!(family.source(), TargetDescriptionSource::External);
    }

    #[test]
    fn missing_manufacturer() {
        let mut raw = family();
        raw.manufacturer = None;

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.kind, ValidationErrorKind::MissingManufacturer);
        assert_eq!(error.variant, None);
        assert_eq!(error.path.to_string(), "manufacturer");
    }

    #[test_case(None, Some(0x12), "cc"; "missing continuation code")]
    #[test_case(Some(0x0c), None, "id"; "missing id")]
    fn missing_manufacturer_field(cc: Option<u32>, id: Option<u32>, field: &'static str) {
        let mut raw = family();
        raw.manufacturer = Some(RawManufacturer { id, cc });

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(
            error.kind,
            ValidationErrorKind::MissingManufacturerField { field }
        );
        assert_eq!(error.path.to_string(), format!("manufacturer.{field}"));
    }

    #[test_case(0x80, 0x12, "cc", 0x80; "continuation code above 7 bits")]
    #[test_case(0x0c, 0x1ff, "id", 0x1ff; "id wider than a byte")]
    fn manufacturer_out_of_range(cc: u32, id: u32, field: &'static str, value: u32) {
        let mut raw = family();
        raw.manufacturer = Some(RawManufacturer {
            id: Some(id),
            cc: Some(cc),
        });

        assert_eq!(
            load_kind(raw),
            ValidationErrorKind::ManufacturerOutOfRange { field, value }
        );
    }

    #[test]
    fn duplicate_variant_names() {
        let mut raw = family();
        raw.variants.push(variant("test"));

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.variant.as_deref(), Some("test"));
        assert_eq!(error.path.to_string(), "variants[1].name");
        assert_eq!(
            error.kind,
            ValidationErrorKind::DuplicateVariant {
                name: "test".to_string()
            }
        );
    }

    #[test]
    fn duplicate_core_names() {
        let mut raw = family();
        raw.variants[0].cores.push(xtensa_core("main"));

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.path.to_string(), "variants[0].cores[1].name");
        assert_eq!(
            error.kind,
            ValidationErrorKind::DuplicateCore {
                name: "main".to_string()
            }
        );
    }

    #[test_case(None; "missing")]
    #[test_case(Some(0); "zero")]
    fn invalid_ir_length(ir_len: Option<u32>) {
        let mut raw = family();
        raw.variants[0].jtag.as_mut().unwrap().scan_chain[1].ir_len = ir_len;

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(
            error.path.to_string(),
            "variants[0].jtag.scan_chain[1].ir_len"
        );

        let name = "app".to_string();
        let expected = match ir_len {
            None => ValidationErrorKind::MissingIrLength { name },
            Some(_) => ValidationErrorKind::ZeroIrLength { name },
        };
        assert_eq!(error.kind, expected);
    }

    #[test_case(0x1000, 0x1000; "empty")]
    #[test_case(0x2000, 0x1000; "inverted")]
    fn empty_ranges(start: u32, end: u32) {
        let mut raw = family();
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Generic(region(start, end, &["main"])));

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.path.to_string(), "variants[0].memory_map[2].range");
        assert!(matches!(error.kind, ValidationErrorKind::EmptyRange { .. }));
    }

    #[test]
    fn region_assigned_to_unknown_core() {
        let mut raw = family();
        raw.variants[0].memory_map[1] =
            RawMemoryRegion::Ram(region(0x3fc8_8000, 0x3fcf_0000, &["main", "app"]));

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.path.to_string(), "variants[0].memory_map[1].cores[1]");
        assert_eq!(
            error.kind,
            ValidationErrorKind::UnknownCore {
                region: "RAM region [0x3fc88000, 0x3fcf0000)".to_string(),
                core: "app".to_string(),
            }
        );
    }

    #[test]
    fn regions_without_cores_are_accepted() {
        let mut raw = family();
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Generic(region(0x6000_0000, 0x6001_0000, &[])));

        let family = TargetFamily::load(raw).unwrap();
        assert_eq!(family.variants()[0].memory_map().len(), 3);
    }

    #[test]
    fn overlap_by_a_single_address() {
        let mut raw = family();
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Ram(region(0x3fce_ffff, 0x3fd0_0000, &["main"])));

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(error.path.to_string(), "variants[0].memory_map[2].range");
        assert_eq!(
            error.kind,
            ValidationErrorKind::OverlappingRegions {
                first: "RAM region [0x3fc88000, 0x3fcf0000)".to_string(),
                second: "RAM region [0x3fceffff, 0x3fd00000)".to_string(),
                core: "main".to_string(),
            }
        );
    }

    #[test]
    fn adjacent_regions_do_not_overlap() {
        let mut raw = family();
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Ram(region(0x3fcf_0000, 0x3fd0_0000, &["main"])));

        assert!(TargetFamily::load(raw).is_ok());
    }

    #[test]
    fn overlapping_regions_of_different_cores_are_accepted() {
        let mut raw = family();
        raw.variants[0].cores.push(xtensa_core("app"));
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Ram(region(0x3fc8_8000, 0x3fcf_0000, &["app"])));

        assert!(TargetFamily::load(raw).is_ok());
    }

    #[test]
    fn mismatched_access_options() {
        let mut raw = family();
        raw.variants[0].cores[0].core_access_options =
            CoreAccessOptions::Arm(ArmCoreAccessOptions::default());

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(
            error.path.to_string(),
            "variants[0].cores[0].core_access_options"
        );
        assert_eq!(
            error.kind,
            ValidationErrorKind::ArchitectureMismatch {
                core: "main".to_string(),
                core_type: CoreType::Xtensa,
                options: crate::Architecture::Arm,
            }
        );
    }

    #[test]
    fn cortex_a_requires_debug_base() {
        let mut raw = family();
        raw.variants[0].cores[0] = RawCore {
            name: "main".to_string(),
            core_type: CoreType::Armv7a,
            core_access_options: CoreAccessOptions::Arm(ArmCoreAccessOptions::default()),
        };

        assert_eq!(
            load_kind(raw),
            ValidationErrorKind::MissingAccessOption {
                core: "main".to_string(),
                core_type: CoreType::Armv7a,
                field: "debug_base",
            }
        );
    }

    #[test]
    fn checks_run_in_order() {
        // Both an overlap and a mismatched core are present; the overlap check runs first.
        let mut raw = family();
        raw.variants[0]
            .memory_map
            .push(RawMemoryRegion::Ram(region(0x3fc8_8000, 0x3fc9_0000, &["main"])));
        raw.variants[0].cores[0].core_access_options =
            CoreAccessOptions::Arm(ArmCoreAccessOptions::default());

        assert!(matches!(
            load_kind(raw),
            ValidationErrorKind::OverlappingRegions { .. }
        ));
    }

    #[test]
    fn duplicate_flash_algorithms() {
        let algorithm = FlashAlgorithm {
            name: "flashloader".to_string(),
            ..Default::default()
        };
        let mut raw = family();
        raw.variants[0].flash_algorithms = vec![algorithm.clone(), algorithm];

        assert_eq!(
            load_kind(raw),
            ValidationErrorKind::DuplicateFlashAlgorithm {
                name: "flashloader".to_string()
            }
        );
    }

    #[test]
    fn flash_algorithm_for_unknown_core() {
        let mut raw = family();
        raw.variants[0].flash_algorithms = vec![FlashAlgorithm {
            name: "flashloader".to_string(),
            cores: vec!["app".to_string()],
            ..Default::default()
        }];

        let error = TargetFamily::load(raw).unwrap_err();
        assert_eq!(
            error.path.to_string(),
            "variants[0].flash_algorithms[0].cores[0]"
        );
    }

    #[test]
    fn flash_algorithm_lookup() {
        let mut raw = family();
        raw.variants[0].flash_algorithms = vec![
            FlashAlgorithm {
                name: "first".to_string(),
                ..Default::default()
            },
            FlashAlgorithm {
                name: "preferred".to_string(),
                default: true,
                cores: vec!["main".to_string()],
                ..Default::default()
            },
        ];

        let family = TargetFamily::load(raw).unwrap();
        let variant = &family.variants()[0];

        assert_eq!(variant.default_flash_algorithm().unwrap().name, "preferred");
        assert!(variant.flash_algorithm("first").unwrap().usable_by("main"));
        assert_eq!(
            variant.flash_algorithm("missing"),
            Err(crate::LookupError::FlashAlgorithmNotFound {
                variant: "test".to_string(),
                algorithm: "missing".to_string(),
            })
        );
    }

    #[test]
    fn scan_chain_policy() {
        let mut raw = family();
        raw.variants[0].jtag.as_mut().unwrap().scan_chain.remove(0);

        // Only `app` is left on the chain, which is fine by default.
        assert!(TargetFamily::load(raw.clone()).is_ok());

        let options = LoadOptions {
            scan_chain_policy: ScanChainPolicy::RequireCoreNames,
            ..Default::default()
        };
        let error = TargetFamily::load_with(raw, &options).unwrap_err();
        assert_eq!(
            error.kind,
            ValidationErrorKind::CoreNotInScanChain {
                core: "main".to_string()
            }
        );
    }

    #[test]
    fn variants_without_scan_chain_pass_strict_policy() {
        let mut raw = family();
        raw.variants[0].jtag = None;

        let options = LoadOptions {
            scan_chain_policy: ScanChainPolicy::RequireCoreNames,
            source: TargetDescriptionSource::BuiltIn,
        };
        let family = TargetFamily::load_with(raw, &options).unwrap();
        assert!(family.variants()[0].scan_chain().is_empty());
        assert_eq!(family.source(), TargetDescriptionSource::BuiltIn);
    }

    #[test]
    fn regions_are_sorted_by_start() {
        let mut raw = family();
        raw.variants[0].memory_map.reverse();

        let family = TargetFamily::load(raw).unwrap();
        let starts = family.variants()[0]
            .memory_regions()
            .map(|region| region.range().start())
            .collect::<Vec<_>>();
        assert_eq!(starts, vec![0x0, 0x3fc8_8000]);
    }

    #[test]
    fn load_options_from_yaml() {
        let options: LoadOptions =
            serde_yaml::from_str("scan_chain_policy: require_core_names").unwrap();
        assert_eq!(options.scan_chain_policy, ScanChainPolicy::RequireCoreNames);
        assert_eq!(options.source, TargetDescriptionSource::External);

        let defaults: LoadOptions = serde_yaml::from_str("{}").unwrap();
        assert_eq!(defaults, LoadOptions::default());
    }
}
