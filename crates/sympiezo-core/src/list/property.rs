//! Cursors over per-edge property values.
//!
//! Properties are not packed; they ride alongside the compressed targets
//! as plain u64 arrays (usually IEEE-754 bit patterns), already permuted
//! and aggregated to match the decoded target order.

/// Streaming read access to one node's property values for one property.
pub trait PropertyCursor {
    fn has_next(&self) -> bool;

    /// Produces the next property value, aligned with the corresponding
    /// target from the adjacency cursor.
    fn next(&mut self) -> Option<u64>;
}

/// Property cursor over either stored values or a constant fallback.
#[derive(Debug)]
pub enum NodePropertyCursor<'a> {
    /// Values stored for this node, in decoded target order.
    Values { values: &'a [u64], idx: usize },
    /// Fallback for nodes without stored values: `value`, repeated once
    /// per target.
    Constant { value: u64, remaining: usize },
}

impl<'a> NodePropertyCursor<'a> {
    pub(crate) fn over(values: &'a [u64]) -> Self {
        Self::Values { values, idx: 0 }
    }

    pub(crate) fn constant(value: u64, degree: usize) -> Self {
        Self::Constant {
            value,
            remaining: degree,
        }
    }
}

impl PropertyCursor for NodePropertyCursor<'_> {
    fn has_next(&self) -> bool {
        match self {
            Self::Values { values, idx } => *idx < values.len(),
            Self::Constant { remaining, .. } => *remaining > 0,
        }
    }

    fn next(&mut self) -> Option<u64> {
        match self {
            Self::Values { values, idx } => {
                let value = values.get(*idx).copied()?;
                *idx += 1;
                Some(value)
            }
            Self::Constant { value, remaining } => {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
                Some(*value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_cursor() {
        let values = [1u64, 2, 3];
        let mut cursor = NodePropertyCursor::over(&values);
        assert!(cursor.has_next());
        assert_eq!(cursor.next(), Some(1));
        assert_eq!(cursor.next(), Some(2));
        assert_eq!(cursor.next(), Some(3));
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_constant_cursor_repeats_per_target() {
        let fallback = 2.5f64.to_bits();
        let mut cursor = NodePropertyCursor::constant(fallback, 2);
        assert_eq!(cursor.next(), Some(fallback));
        assert_eq!(cursor.next(), Some(fallback));
        assert_eq!(cursor.next(), None);
    }
}
