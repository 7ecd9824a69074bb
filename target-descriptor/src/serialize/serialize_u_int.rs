use serde::{Deserialize, Deserializer, Serializer};

/// This trait is used to constrain the serialization of numbers to hex strings, to be generic for unsigned integers.
pub trait SerializeUnsignedInt: Sized + TryFrom<u64> {
    fn serialize_int<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer;

    /// Reads the integer in its native encoding, for formats that are not human-readable.
    fn deserialize_int<'de, D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>;
}

macro_rules! impl_serialize_unsigned_int {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl SerializeUnsignedInt for $ty {
                fn serialize_int<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.$method(*self)
                }

                fn deserialize_int<'de, D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    <$ty>::deserialize(deserializer)
                }
            }
        )*
    };
}

impl_serialize_unsigned_int!(
    u8 => serialize_u8,
    u16 => serialize_u16,
    u32 => serialize_u32,
    u64 => serialize_u64,
);
