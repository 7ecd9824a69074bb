use serde::{self, ser::SerializeStruct, Deserialize, Deserializer, Serializer};
use std::ops::Range;

pub(crate) fn serialize<S>(memory_range: &Range<u32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // We serialize the range as hex strings when generating human-readable formats such as YAML,
    let check_for_human_readable = serializer.is_human_readable();
    let mut state = serializer.serialize_struct("Range", 2)?;
    if check_for_human_readable {
        state.serialize_field("start", format!("{:#x}", memory_range.start).as_str())?;
        state.serialize_field("end", format!("{:#x}", memory_range.end).as_str())?;
    } else {
        state.serialize_field("start", &memory_range.start)?;
        state.serialize_field("end", &memory_range.end)?;
    }
    state.end()
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Range<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    // Inverted or empty ranges are let through; the loader reports them with a field path.
    #[derive(Deserialize)]
    #[serde(deny_unknown_fields)]
    struct HexRange {
        #[serde(deserialize_with = "super::hex_u_int::deserialize")]
        start: u32,
        #[serde(deserialize_with = "super::hex_u_int::deserialize")]
        end: u32,
    }

    let HexRange { start, end } = HexRange::deserialize(deserializer)?;
    Ok(start..end)
}
