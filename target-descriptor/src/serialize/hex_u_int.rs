use super::serialize_u_int::SerializeUnsignedInt;
use serde::{de, Deserializer, Serializer};
use std::fmt;

pub(crate) fn serialize<T, S>(memory_address: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: fmt::LowerHex + SerializeUnsignedInt,
{
    // We serialize the range as hex strings when generating human-readable formats such as YAML,
    let check_for_human_readable = serializer.is_human_readable();
    if check_for_human_readable {
        serializer.serialize_str(format!("{:#x}", memory_address).as_str())
    } else {
        memory_address.serialize_int(serializer)
    }
}

pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: SerializeUnsignedInt,
{
    if deserializer.is_human_readable() {
        let value = deserializer.deserialize_any(HexVisitor)?;
        T::try_from(value).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Unsigned(value), &"an integer in range")
        })
    } else {
        T::deserialize_int(deserializer)
    }
}

/// Accepts plain integers as well as `0x`-prefixed hex strings.
struct HexVisitor;

impl de::Visitor<'_> for HexVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "an unsigned integer or a hex string")
    }

    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(v)
    }

    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        let trimmed = v.trim().replace('_', "");
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u64::from_str_radix(hex, 16),
            None => trimmed.parse(),
        };

        parsed.map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Address {
        #[serde(with = "super")]
        value: u32,
    }

    #[test]
    fn accepts_integers_and_hex_strings() {
        let plain: Address = serde_yaml::from_str("value: 4096").unwrap();
        let hex: Address = serde_yaml::from_str("value: 0x1000").unwrap();
        let quoted: Address = serde_yaml::from_str("value: '0x1000'").unwrap();

        assert_eq!(plain, Address { value: 0x1000 });
        assert_eq!(hex, plain);
        assert_eq!(quoted, plain);
    }

    #[test]
    fn rejects_values_that_do_not_fit() {
        assert!(serde_yaml::from_str::<Address>("value: 0x100000000").is_err());
        assert!(serde_yaml::from_str::<Address>("value: -1").is_err());
        assert!(serde_yaml::from_str::<Address>("value: 'flash'").is_err());
    }

    #[test]
    fn serializes_as_hex() {
        let yaml = serde_yaml::to_string(&Address { value: 0x3fc8_8000 }).unwrap();
        assert_eq!(yaml, "value: '0x3fc88000'\n");
    }
}
