use super::serialize_u_int::SerializeUnsignedInt;
use serde::{self, ser::Serializer, Deserialize, Deserializer};

pub(crate) fn serialize<T, S>(variant_value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: std::fmt::LowerHex + SerializeUnsignedInt,
{
    match variant_value {
        Some(val) => {
            let check_for_human_readable = serializer.is_human_readable();
            if check_for_human_readable {
                serializer.serialize_some(format!("{:#x}", val).as_str())
            } else {
                serializer.serialize_some(&Native(val))
            }
        }
        None => serializer.serialize_none(),
    }
}

pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: SerializeUnsignedInt,
{
    Ok(Option::<Hex<T>>::deserialize(deserializer)?.map(|hex| hex.0))
}

struct Native<'a, T>(&'a T);

impl<T: SerializeUnsignedInt> serde::Serialize for Native<'_, T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize_int(serializer)
    }
}

struct Hex<T>(T);

impl<'de, T: SerializeUnsignedInt> Deserialize<'de> for Hex<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        super::hex_u_int::deserialize(deserializer).map(Hex)
    }
}
