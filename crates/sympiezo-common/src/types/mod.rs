//! Core type definitions for Sympiezo.
//!
//! Node identifiers stay plain `u64` inside the codec: every hot loop
//! operates on packed 64-bit blocks, and a newtype would only add casts
//! between the packed representation and the id space.

/// Identifies a node in the graph. Non-negative by construction.
pub type NodeId = u64;

/// Reinterprets a floating point property value for transport.
///
/// Property values travel through the compression engine as raw 64-bit
/// patterns; this is the encoding half of that contract.
#[inline]
#[must_use]
pub fn double_to_bits(value: f64) -> u64 {
    value.to_bits()
}

/// Reinterprets a transported 64-bit pattern as its floating point value.
#[inline]
#[must_use]
pub fn bits_to_double(bits: u64) -> f64 {
    f64::from_bits(bits)
}
