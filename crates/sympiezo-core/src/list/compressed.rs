//! Per-node handle tying a packed region to its decoded length.

use sympiezo_common::PageSlice;

/// One node's compressed adjacency list: where its packed region lives,
/// how many values it decodes to, and any per-edge property arrays.
///
/// The degree is not stored in the region itself; together with the
/// list-wide tail strategy it is all a cursor needs to interpret the
/// region's header.
#[derive(Debug)]
pub struct Compressed {
    slice: PageSlice,
    degree: u32,
    properties: Option<Box<[Box<[u64]>]>>,
}

impl Compressed {
    pub(crate) fn new(slice: PageSlice, degree: u32) -> Self {
        Self {
            slice,
            degree,
            properties: None,
        }
    }

    /// Attaches aggregated property arrays, one per property, each of
    /// exactly `degree` values in decoded target order.
    pub(crate) fn set_properties(&mut self, properties: Box<[Box<[u64]>]>) {
        debug_assert!(properties
            .iter()
            .all(|p| p.len() == self.degree as usize));
        self.properties = Some(properties);
    }

    /// Number of values the region decodes to.
    #[must_use]
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Location of the packed region.
    #[must_use]
    pub fn slice(&self) -> PageSlice {
        self.slice
    }

    /// Stored property arrays, if any.
    #[must_use]
    pub fn properties(&self) -> Option<&[Box<[u64]>]> {
        self.properties.as_deref()
    }
}
