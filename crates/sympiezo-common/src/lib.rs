//! # sympiezo-common
//!
//! Foundation layer for Sympiezo: types, paged memory arena, and utilities.
//!
//! This crate provides the fundamental building blocks used by all other
//! Sympiezo crates. It has no internal dependencies and should be kept minimal.
//!
//! ## Modules
//!
//! - [`types`] - Core type definitions (NodeId, property transport helpers)
//! - [`memory`] - Paged memory management (Address, PageArena, LocalAllocator)
//! - [`utils`] - Utility functions and helpers (errors)

pub mod memory;
pub mod types;
pub mod utils;

// Re-export commonly used types at crate root
pub use memory::{Address, LocalAllocator, PageArena, PageSlice};
pub use types::NodeId;
pub use utils::error::{Error, Result};
