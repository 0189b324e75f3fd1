//! The finished, read-only adjacency list.

use sympiezo_common::{Address, NodeId, Result};

use crate::list::compressed::Compressed;
use crate::list::cursor::PackedCursor;
use crate::list::property::NodePropertyCursor;
use crate::list::ListConfig;

/// Footprint of a finished list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryInfo {
    /// Number of pages backing the packed regions.
    pub pages: usize,
    /// Total bytes held by those pages, bump-allocation slack included.
    pub allocated_bytes: usize,
    /// Bytes actually covered by packed regions.
    pub used_bytes: usize,
    /// Bytes of those regions spent on per-block width headers.
    pub header_bytes: usize,
    /// Bytes of property values stored outside the pages.
    pub property_bytes: usize,
}

/// Immutable compressed adjacency list over all nodes.
///
/// Pages are owned here and freed exactly once via [`release`]
/// (dropping the list without releasing reclaims them too). Cursors
/// borrow page memory, so none can outlive the list, and opening one
/// after `release` reports the lifecycle error instead of reading freed
/// memory.
///
/// [`release`]: PackedAdjacencyList::release
#[derive(Debug)]
pub struct PackedAdjacencyList {
    config: ListConfig,
    pages: Vec<Address>,
    nodes: Box<[Option<Compressed>]>,
    memory: MemoryInfo,
}

impl PackedAdjacencyList {
    pub(crate) fn new(
        config: ListConfig,
        pages: Vec<Address>,
        nodes: Box<[Option<Compressed>]>,
        memory: MemoryInfo,
    ) -> Self {
        Self {
            config,
            pages,
            nodes,
            memory,
        }
    }

    /// Number of node slots, compressed or not.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Decoded length of `node`'s list; 0 for nodes never compressed.
    #[must_use]
    pub fn degree(&self, node: NodeId) -> usize {
        self.entry(node).map_or(0, |c| c.degree() as usize)
    }

    /// Footprint of the finished list.
    #[must_use]
    pub fn memory_info(&self) -> MemoryInfo {
        self.memory
    }

    /// Opens a cursor over `node`'s list. Unknown and zero-degree nodes
    /// get the empty cursor.
    ///
    /// # Errors
    ///
    /// [`sympiezo_common::Error::UseAfterFree`] if the list was released.
    pub fn cursor(&self, node: NodeId) -> Result<PackedCursor<'_>> {
        let Some(compressed) = self.entry(node) else {
            return Ok(PackedCursor::Empty);
        };
        let slice = compressed.slice();
        let page = self.pages[slice.page as usize].bytes()?;
        let start = slice.offset as usize;
        let region = &page[start..start + slice.len as usize];
        Ok(PackedCursor::new(
            self.config.strategy,
            region,
            compressed.degree() as usize,
            self.config.flags.delta(),
        ))
    }

    /// Repositions `cursor` over `node`'s list, reusing it instead of
    /// opening a fresh one in hot traversal loops.
    ///
    /// # Errors
    ///
    /// [`sympiezo_common::Error::UseAfterFree`] if the list was released.
    pub fn rescan<'a>(&'a self, cursor: &mut PackedCursor<'a>, node: NodeId) -> Result<()> {
        *cursor = self.cursor(node)?;
        Ok(())
    }

    /// Opens a property cursor for `node`'s `property`-th property, in
    /// decoded target order. Nodes without stored values get a constant
    /// cursor yielding `fallback` once per target.
    #[must_use]
    pub fn property_cursor(
        &self,
        node: NodeId,
        property: usize,
        fallback: u64,
    ) -> NodePropertyCursor<'_> {
        match self.entry(node).and_then(|c| c.properties()?.get(property)) {
            Some(values) => NodePropertyCursor::over(values),
            None => NodePropertyCursor::constant(fallback, self.degree(node)),
        }
    }

    /// Frees every backing page, returning the total bytes released.
    ///
    /// # Errors
    ///
    /// [`sympiezo_common::Error::DoubleFree`] on a second release.
    pub fn release(&mut self) -> Result<usize> {
        let mut freed = 0usize;
        for page in &mut self.pages {
            freed += page.free()?;
        }
        Ok(freed)
    }

    fn entry(&self, node: NodeId) -> Option<&Compressed> {
        self.nodes.get(node as usize)?.as_ref()
    }
}
