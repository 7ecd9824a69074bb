use crate::chip::Variant;
use crate::error::LookupError;
use crate::raw::RawTargetFamily;
use crate::validate::LoadOptions;

use jep106::JEP106Code;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Source of a target description.
///
/// This is used for diagnostics, when
/// an error related to a target description occurs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetDescriptionSource {
    /// The target description is a built-in target description,
    /// which was shipped together with the tool.
    BuiltIn,
    /// The target description was from an external source
    /// during runtime.
    #[default]
    External,
}

/// Type of a supported core.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoreType {
    /// ARMv6-M: Cortex M0, M0+, M1
    Armv6m,
    /// ARMv7-A: Cortex A7, A9, A15
    Armv7a,
    /// ARMv7-M: Cortex M3
    Armv7m,
    /// ARMv7e-M: Cortex M4, M7
    Armv7em,
    /// ARMv8-A: Cortex A35, A55, A72
    Armv8a,
    /// ARMv8-M: Cortex M23, M33
    Armv8m,
    /// RISC-V
    Riscv,
    /// Xtensa LX6/LX7
    Xtensa,
}

impl CoreType {
    /// Returns true if the core type is an ARM Cortex-M
    pub fn is_cortex_m(&self) -> bool {
        matches!(
            self,
            CoreType::Armv6m | CoreType::Armv7em | CoreType::Armv7m | CoreType::Armv8m
        )
    }

    /// Returns the parent architecture family of this core type.
    pub fn architecture(&self) -> Architecture {
        match self {
            CoreType::Riscv => Architecture::Riscv,
            CoreType::Xtensa => Architecture::Xtensa,
            _ => Architecture::Arm,
        }
    }
}

/// The architecture family of a specific [`CoreType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// An ARM core of one of the ARMv6/7/8 core types.
    Arm,
    /// A RISC-V core.
    Riscv,
    /// An Xtensa core.
    Xtensa,
}

/// The JEP106 identity of the chip manufacturer.
///
/// Both the continuation code (the JEP106 bank) and the identity code carry 7 meaningful bits.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Manufacturer {
    continuation_code: u8,
    id: u8,
}

impl Manufacturer {
    /// Largest value either field may take.
    pub const MAX_CODE: u8 = 0x7f;

    /// Creates a manufacturer code, or returns `None` if a field does not fit in 7 bits.
    pub fn new(continuation_code: u8, id: u8) -> Option<Self> {
        (continuation_code <= Self::MAX_CODE && id <= Self::MAX_CODE)
            .then_some(Self { continuation_code, id })
    }

    /// The JEP106 continuation code, i.e. the bank in which `id` has to be looked up.
    pub fn continuation_code(&self) -> u8 {
        self.continuation_code
    }

    /// The JEP106 identity code.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// The code in the form used by the [`jep106`] crate.
    pub fn jep106(&self) -> JEP106Code {
        JEP106Code::new(self.continuation_code, self.id)
    }

    /// The registered manufacturer name, if the code is known.
    pub fn name(&self) -> Option<&'static str> {
        self.jep106().get()
    }
}

impl fmt::Debug for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Manufacturer {{ cc: {:#04x}, id: {:#04x} }}",
            self.continuation_code, self.id
        )
    }
}

impl fmt::Display for Manufacturer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(
                f,
                "unknown manufacturer (cc {:#04x}, id {:#04x})",
                self.continuation_code, self.id
            ),
        }
    }
}

/// This describes a chip family with all its variants.
///
/// A family is only ever created by [`TargetFamily::load`] (or one of its convenience forms), which
/// either validates the whole description or rejects it. It is never modified afterwards, so a
/// loaded family can be shared between threads for read-only queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFamily {
    pub(crate) name: String,
    pub(crate) manufacturer: Manufacturer,
    pub(crate) variants: Vec<Variant>,
    /// Source of the target description, used for diagnostics
    pub(crate) source: TargetDescriptionSource,
}

impl TargetFamily {
    /// This is the name of the chip family in base form.
    /// E.g. `esp32s3`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The JEP106 code of the manufacturer.
    pub fn manufacturer(&self) -> Manufacturer {
        self.manufacturer
    }

    /// Get the different [`Variant`]s which are part of this
    /// family, in declaration order.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Looks up a variant by its exact name.
    pub fn variant(&self, name: &str) -> Result<&Variant, LookupError> {
        self.variants
            .iter()
            .find(|variant| variant.name == name)
            .ok_or_else(|| LookupError::VariantNotFound(name.to_string()))
    }

    /// Where this description came from.
    pub fn source(&self) -> TargetDescriptionSource {
        self.source
    }

    /// Lowers the family back into the document schema, e.g. to write it out again.
    pub fn to_raw(&self) -> RawTargetFamily {
        RawTargetFamily::from(self)
    }
}

impl Serialize for TargetFamily {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_raw().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TargetFamily {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawTargetFamily::deserialize(deserializer)?;
        TargetFamily::load_with(raw, &LoadOptions::default()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manufacturer_fields_are_limited_to_seven_bits() {
        assert!(Manufacturer::new(0x7f, 0x7f).is_some());
        assert!(Manufacturer::new(0x80, 0x12).is_none());
        assert!(Manufacturer::new(0x0c, 0x80).is_none());
    }

    #[test]
    fn manufacturer_converts_to_jep106() {
        let espressif = Manufacturer::new(0x0c, 0x12).unwrap();
        let code = espressif.jep106();

        assert_eq!(code.cc, 0x0c);
        assert_eq!(code.id, 0x12);
        assert_eq!(
            format!("{espressif:?}"),
            "Manufacturer { cc: 0x0c, id: 0x12 }"
        );
    }

    #[test]
    fn core_types_map_to_architectures() {
        assert_eq!(CoreType::Xtensa.architecture(), Architecture::Xtensa);
        assert_eq!(CoreType::Riscv.architecture(), Architecture::Riscv);
        assert_eq!(CoreType::Armv7em.architecture(), Architecture::Arm);
        assert_eq!(CoreType::Armv8a.architecture(), Architecture::Arm);
        assert!(CoreType::Armv6m.is_cortex_m());
        assert!(!CoreType::Armv7a.is_cortex_m());
    }
}
