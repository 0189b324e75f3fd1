//! # sympiezo-core
//!
//! The adjacency-list compression engine.
//!
//! Per node, a raw (possibly unsorted, possibly duplicated) neighbor-id
//! array is sorted, aggregated, delta encoded, and bit-packed into a
//! compact byte region carved out of shared pages; traversal reads it back
//! through reusable cursors that decompress one block at a time.
//!
//! ## Modules
//!
//! - [`pack`] - Fixed-width bit packing and var-long encoding
//! - [`compress`] - Delta/aggregation transform and packing strategies
//! - [`list`] - Compressed handles, parallel builder, adjacency list, cursors

pub mod compress;
pub mod list;
pub mod pack;

// Re-export commonly used types
pub use compress::{Aggregation, CompressFlags, TailStrategy};
pub use list::{
    build_adjacency_list, AdjacencyCursor, ListBuilder, ListConfig, MemoryInfo, NodeAdjacency,
    NodeCompressor, NodePropertyCursor, PackedAdjacencyList, PackedCursor, PropertyCursor,
};
pub use pack::BLOCK_SIZE;
pub use sympiezo_common::{Error, NodeId, Result};
