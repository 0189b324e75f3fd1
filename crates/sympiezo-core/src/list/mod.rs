//! Compressed adjacency lists: construction, storage, iteration.
//!
//! - [`builder`] - Parallel compression pipeline
//! - [`compressed`] - Per-node region handle
//! - [`adjacency`] - The finished, read-only list
//! - [`cursor`] - Streaming decompression
//! - [`property`] - Per-edge property access

pub mod adjacency;
pub mod builder;
pub mod compressed;
pub mod cursor;
pub mod property;

pub use adjacency::{MemoryInfo, PackedAdjacencyList};
pub use builder::{build_adjacency_list, ListBuilder, NodeAdjacency, NodeCompressor};
pub use compressed::Compressed;
pub use cursor::{AdjacencyCursor, PackedCursor};
pub use property::{NodePropertyCursor, PropertyCursor};

use crate::compress::{Aggregation, CompressFlags, TailStrategy};

/// List-wide compression configuration, fixed at build time.
#[derive(Debug, Clone, Default)]
pub struct ListConfig {
    /// How the final, possibly partial block of each region is encoded.
    pub strategy: TailStrategy,
    /// Sort, delta, and (for property-less lists) aggregation selection.
    pub flags: CompressFlags,
    /// One policy per property array, applied when duplicates collapse.
    /// Mixing [`Aggregation::None`] with other policies is not supported.
    pub aggregations: Box<[Aggregation]>,
}

impl ListConfig {
    /// The common configuration: sorted, delta encoded, no properties.
    #[must_use]
    pub fn sorted(strategy: TailStrategy) -> Self {
        Self {
            strategy,
            flags: CompressFlags::sort_delta(Aggregation::None),
            aggregations: Box::new([]),
        }
    }

    /// Sorted and delta encoded with per-property aggregation policies.
    #[must_use]
    pub fn aggregating(strategy: TailStrategy, aggregations: Box<[Aggregation]>) -> Self {
        // flag-level aggregation applies to property-less lists only;
        // property merging follows the per-property policies
        let first = aggregations.first().copied().unwrap_or_default();
        Self {
            strategy,
            flags: CompressFlags::sort_delta(first),
            aggregations,
        }
    }
}
