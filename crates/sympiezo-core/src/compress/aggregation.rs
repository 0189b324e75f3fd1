//! Policies for collapsing parallel edges.

/// How duplicate targets (parallel edges) and their property values are
/// collapsed during the delta transform.
///
/// Property values are raw IEEE-754 bit patterns; merging interprets them
/// as `f64`. A list either aggregates every property or none at all:
/// `None` must not be mixed with the other policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregation {
    /// Keep parallel edges as distinct entries.
    #[default]
    None,
    /// Sum the property values of parallel edges.
    Sum,
    /// Keep the smallest property value.
    Min,
    /// Keep the largest property value.
    Max,
    /// Count parallel edges, ignoring their property values.
    Count,
}

impl Aggregation {
    /// Stable ordinal for transport in the low bits of the compression
    /// flags.
    #[must_use]
    pub fn ordinal(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Sum => 1,
            Self::Min => 2,
            Self::Max => 3,
            Self::Count => 4,
        }
    }

    /// Inverse of [`ordinal`](Self::ordinal).
    #[must_use]
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(Self::None),
            1 => Some(Self::Sum),
            2 => Some(Self::Min),
            3 => Some(Self::Max),
            4 => Some(Self::Count),
            _ => None,
        }
    }

    /// Prepares the first occurrence of a property value.
    #[inline]
    #[must_use]
    pub fn normalize(self, value: u64) -> u64 {
        match self {
            Self::Count => 1.0f64.to_bits(),
            _ => value,
        }
    }

    /// Merges the property value of another parallel edge into the running
    /// aggregate. Never called for [`Aggregation::None`].
    #[inline]
    #[must_use]
    pub fn merge(self, current: u64, value: u64) -> u64 {
        let a = f64::from_bits(current);
        let b = f64::from_bits(value);
        match self {
            Self::Sum => (a + b).to_bits(),
            Self::Min => a.min(b).to_bits(),
            Self::Max => a.max(b).to_bits(),
            Self::Count => (a + 1.0).to_bits(),
            Self::None => {
                debug_assert!(false, "Aggregation::None never merges");
                current
            }
        }
    }
}
