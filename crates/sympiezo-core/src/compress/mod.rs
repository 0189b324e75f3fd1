//! Compression configuration and strategies.
//!
//! - [`aggregation`] - Policies for collapsing parallel edges
//! - [`delta`] - Sort + aggregate + delta transform
//! - [`packer`] - Block packing with three interchangeable tail strategies

pub mod aggregation;
pub mod delta;
pub mod packer;

pub use aggregation::Aggregation;

/// How the final, possibly partial block of a list is encoded.
///
/// Chosen once, at list-build configuration time; the matching cursor
/// variant decodes it. All three produce identical decoded sequences for
/// identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TailStrategy {
    /// The tail block is bit-packed like a full block, just shorter.
    #[default]
    BlockAligned,
    /// Full blocks are bit-packed; the tail values are var-long encoded,
    /// skipping the per-block width overhead for small tails.
    VarLongTail,
    /// The first value (the absolute head id, typically much larger than
    /// the deltas that follow) is var-long encoded into the header region;
    /// the remaining values are packed as in [`TailStrategy::BlockAligned`]
    /// with correspondingly narrower blocks.
    InlinedHead,
}

/// Global compression flags: independent SORT and DELTA bits plus the
/// aggregation ordinal in the low bits. The ordinal is interpreted only
/// when DELTA is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressFlags(u32);

impl CompressFlags {
    const SORT_BIT: u32 = 1 << 8;
    const DELTA_BIT: u32 = 1 << 9;
    const AGGREGATION_MASK: u32 = 0xFF;

    /// Pass targets through untouched: no sort, no delta, no aggregation.
    pub const PASS: Self = Self(0);

    /// Builds flags from the individual selections.
    #[must_use]
    pub fn new(sort: bool, delta: bool, aggregation: Aggregation) -> Self {
        let mut value = aggregation.ordinal();
        if sort {
            value |= Self::SORT_BIT;
        }
        if delta {
            value |= Self::DELTA_BIT;
        }
        Self(value)
    }

    /// The usual full pipeline: sort, aggregate, delta encode.
    #[must_use]
    pub fn sort_delta(aggregation: Aggregation) -> Self {
        Self::new(true, true, aggregation)
    }

    /// Whether targets are sorted before packing.
    #[must_use]
    pub fn sort(self) -> bool {
        self.0 & Self::SORT_BIT != 0
    }

    /// Whether targets are delta encoded (and duplicates aggregated).
    #[must_use]
    pub fn delta(self) -> bool {
        self.0 & Self::DELTA_BIT != 0
    }

    /// The aggregation selected for property-less lists. Meaningful only
    /// when [`delta`](Self::delta) is set.
    #[must_use]
    pub fn aggregation(self) -> Aggregation {
        Aggregation::from_ordinal(self.0 & Self::AGGREGATION_MASK)
            .unwrap_or(Aggregation::None)
    }
}

impl Default for CompressFlags {
    fn default() -> Self {
        Self::PASS
    }
}
