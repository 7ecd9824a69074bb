//! Hex (de)serializers used by the descriptor schema.
//!
//! Human-readable formats get `0x` strings on output and accept either plain integers or hex
//! strings on input, so a descriptor written by [`serde_yaml`] can be read back unchanged.

pub(crate) mod hex_option;
pub(crate) mod hex_range;
pub(crate) mod hex_u_int;
mod serialize_u_int;
