//! Low-level integer packing primitives.
//!
//! - [`bitpack`] - Fixed-width packing of u64 runs into little-endian words
//! - [`varlong`] - Variable-length (7 payload bits per byte) encoding
//!
//! Both are pure and allocation-free; everything above them (strategies,
//! cursors) composes these two codecs.

pub mod bitpack;
pub mod varlong;

pub use bitpack::BLOCK_SIZE;
