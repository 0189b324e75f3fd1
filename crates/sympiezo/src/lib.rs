//! # Sympiezo
//!
//! A compressed adjacency-list engine for graph analytics.
//!
//! Feed it one neighbor array per node and it hands back a
//! [`PackedAdjacencyList`]: every list sorted, delta encoded, and
//! bit-packed into shared pages, readable through cursors that decompress
//! one 64-value block at a time.
//!
//! ## Tail Strategies
//!
//! | Strategy | Tail encoding | Best for |
//! | -------- | ------------- | -------- |
//! | [`TailStrategy::BlockAligned`] | bit-packed like a full block | uniform access, `advance_by` |
//! | [`TailStrategy::VarLongTail`] | var-long bytes, no header | many short lists |
//! | [`TailStrategy::InlinedHead`] | head var-long in the header | narrow deltas after a large head |
//!
//! All three decode to identical sequences; pick per workload.
//!
//! ## Quick Start
//!
//! ```rust
//! use sympiezo::{build_adjacency_list, AdjacencyCursor, ListConfig, NodeAdjacency, TailStrategy};
//!
//! // Raw neighbor ids, unsorted and with a parallel edge
//! let input = vec![
//!     NodeAdjacency::new(0, vec![9, 1, 5, 5]),
//!     NodeAdjacency::new(1, vec![0]),
//! ];
//! let config = ListConfig::sorted(TailStrategy::BlockAligned);
//! let list = build_adjacency_list(config, 2, input)?;
//!
//! let mut neighbors = list.cursor(0)?;
//! assert_eq!(neighbors.size(), 4);
//! assert_eq!(neighbors.next(), Some(1));
//! assert_eq!(neighbors.skip_until(5), Some(9));
//! # Ok::<(), sympiezo::Error>(())
//! ```

// Re-export the main list-building and traversal API
pub use sympiezo_core::{
    build_adjacency_list, AdjacencyCursor, Aggregation, CompressFlags, ListBuilder, ListConfig,
    MemoryInfo, NodeAdjacency, NodeCompressor, NodePropertyCursor, PackedAdjacencyList,
    PackedCursor, PropertyCursor, TailStrategy, BLOCK_SIZE,
};

// Re-export common types - ids, errors, and the page primitives
pub use sympiezo_common::types::{bits_to_double, double_to_bits};
pub use sympiezo_common::{Address, Error, NodeId, PageArena, PageSlice, Result};
