use crate::serialize::hex_option;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// The description of a flash algorithm, as referenced by name from flashing requests.
///
/// The algorithm is opaque to this crate: the instructions are carried along, but never executed
/// or inspected. Writing to [`MemoryKind::Nvm`](crate::MemoryKind::Nvm) regions has to go through
/// one of these.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlashAlgorithm {
    /// The name of the flash algorithm.
    pub name: String,
    /// The description of the algorithm.
    #[serde(default)]
    #[cfg_attr(not(feature = "bincode"), serde(skip_serializing_if = "String::is_empty"))]
    pub description: String,
    /// Whether this flash algorithm is the default one or not.
    #[serde(default)]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "std::ops::Not::not")
    )]
    pub default: bool,
    /// The position-independent code of the algorithm.
    #[serde(default, deserialize_with = "deserialize", serialize_with = "serialize")]
    pub instructions: Vec<u8>,
    /// Address in RAM the instructions are loaded to. Optional.
    #[serde(
        default,
        serialize_with = "hex_option::serialize",
        deserialize_with = "hex_option::deserialize"
    )]
    #[cfg_attr(
        not(feature = "bincode"),
        serde(skip_serializing_if = "Option::is_none")
    )]
    pub load_address: Option<u32>,
    /// List of cores that can use this algorithm. Empty means all cores of the variant.
    #[serde(default)]
    #[cfg_attr(not(feature = "bincode"), serde(skip_serializing_if = "Vec::is_empty"))]
    pub cores: Vec<String>,
}

impl FlashAlgorithm {
    /// Returns whether the algorithm can be run on the given core.
    pub fn usable_by(&self, core_name: &str) -> bool {
        self.cores.is_empty() || self.cores.iter().any(|core| core == core_name)
    }
}

pub(crate) fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if serializer.is_human_readable() {
        serializer.serialize_str(&BASE64.encode(bytes))
    } else {
        serializer.serialize_bytes(bytes)
    }
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Base64Visitor;

    impl serde::de::Visitor<'_> for Base64Visitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "base64 ASCII text")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            BASE64.decode(v).map_err(serde::de::Error::custom)
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(v.to_vec())
        }
    }

    if deserializer.is_human_readable() {
        deserializer.deserialize_str(Base64Visitor)
    } else {
        deserializer.deserialize_byte_buf(Base64Visitor)
    }
}
