//! Shared page list and per-worker bump allocation.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::memory::Address;
use crate::utils::error::{Error, Result};

/// Default page size in bytes (256 KiB).
pub const PAGE_SIZE: usize = 1 << 18;

/// Location of a byte region within the arena's page list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    /// Index into the arena's page list.
    pub page: u32,
    /// Byte offset of the region within its page.
    pub offset: u32,
    /// Byte length of the region.
    pub len: u32,
}

#[derive(Debug)]
enum PageState {
    /// The page is owned by the arena and may be read or positionally written.
    Resident(Address),
    /// The page is checked out to exactly one worker's bump allocator.
    CheckedOut { size: usize },
}

/// Shared, lock-protected page list.
///
/// Workers check pages out one at a time and bump-allocate within them
/// privately; the mutex is held only for the check-out and check-in, so
/// contention is bounded by the number of pages, not the number of nodes.
#[derive(Debug)]
pub struct PageArena {
    page_size: usize,
    pages: Mutex<Vec<PageState>>,
}

impl PageArena {
    /// Creates an arena with the default [`PAGE_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(PAGE_SIZE)
    }

    /// Creates an arena with a custom page size. Must be a multiple of 8.
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        assert!(page_size > 0 && page_size % 8 == 0, "page size must be a positive multiple of 8");
        Self {
            page_size,
            pages: Mutex::new(Vec::new()),
        }
    }

    /// The size of a regular page in bytes.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages handed out so far.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }

    /// Checks a fresh zeroed page out to the calling worker.
    ///
    /// Requests larger than the regular page size get a dedicated,
    /// oversized page. The buffer is allocated outside the lock; the lock
    /// only guards the page list itself.
    pub(crate) fn acquire(&self, min_size: usize) -> (u32, Box<[u8]>) {
        let size = min_size.max(self.page_size);
        let buf = vec![0u8; size].into_boxed_slice();
        let id = {
            let mut pages = self.pages.lock();
            let id = pages.len() as u32;
            pages.push(PageState::CheckedOut { size });
            id
        };
        trace!(page = id, size, "page checked out");
        (id, buf)
    }

    /// Returns a checked-out page to the arena.
    pub(crate) fn put_back(&self, id: u32, buf: Box<[u8]>) {
        let mut pages = self.pages.lock();
        debug_assert!(
            matches!(pages[id as usize], PageState::CheckedOut { size } if size == buf.len()),
            "page {id} returned by a worker that does not own it"
        );
        pages[id as usize] = PageState::Resident(Address::new(buf));
    }

    /// Writes `bytes` at a previously reserved location.
    ///
    /// Used when content can only be produced after its final position is
    /// known. The target page must be resident, i.e. already returned by
    /// the worker that allocated the reservation.
    ///
    /// # Errors
    ///
    /// [`Error::PageNotResident`] if the page is still checked out, or a
    /// lifecycle error if it was already freed.
    pub fn insert_at(&self, slice: PageSlice, bytes: &[u8]) -> Result<()> {
        assert_eq!(bytes.len(), slice.len as usize, "reservation length mismatch");
        let mut pages = self.pages.lock();
        match pages.get_mut(slice.page as usize) {
            Some(PageState::Resident(address)) => {
                let offset = slice.offset as usize;
                let data = address.bytes_mut()?;
                data[offset..offset + bytes.len()].copy_from_slice(bytes);
                Ok(())
            }
            _ => Err(Error::PageNotResident { page: slice.page }),
        }
    }

    /// Finalizes the arena, transferring page ownership to the caller.
    ///
    /// # Errors
    ///
    /// [`Error::AllocatorInUse`] if any worker still holds a page.
    pub fn into_addresses(self) -> Result<Vec<Address>> {
        let pages = self.pages.into_inner();
        let mut addresses = Vec::with_capacity(pages.len());
        for page in pages {
            match page {
                PageState::Resident(address) => addresses.push(address),
                PageState::CheckedOut { .. } => return Err(Error::AllocatorInUse),
            }
        }
        Ok(addresses)
    }
}

impl Default for PageArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-worker bump allocator over a private page.
///
/// `allocate` hands out monotonically increasing offsets within the current
/// page and only goes back to the shared [`PageArena`] when the page is
/// exhausted. Dropping the allocator returns the current page.
#[derive(Debug)]
pub struct LocalAllocator {
    arena: Arc<PageArena>,
    page: Option<(u32, Box<[u8]>)>,
    top: usize,
}

impl LocalAllocator {
    /// Creates a worker-local allocator backed by `arena`.
    #[must_use]
    pub fn new(arena: Arc<PageArena>) -> Self {
        Self {
            arena,
            page: None,
            top: 0,
        }
    }

    /// Reserves `len` bytes and returns their location plus a writable,
    /// zero-initialized view. `len` must be a multiple of 8.
    pub fn allocate(&mut self, len: usize) -> (PageSlice, &mut [u8]) {
        debug_assert_eq!(len % 8, 0, "allocations must be 8-byte aligned");
        let fits = self
            .page
            .as_ref()
            .is_some_and(|(_, buf)| self.top + len <= buf.len());
        if !fits {
            self.return_page();
            // oversized requests get a dedicated page of exactly their size
            let (id, buf) = self.arena.acquire(len);
            self.page = Some((id, buf));
            self.top = 0;
        }
        let Some((id, buf)) = self.page.as_mut() else {
            unreachable!("a page was just acquired")
        };
        let offset = self.top;
        self.top += len;
        let slice = PageSlice {
            page: *id,
            offset: offset as u32,
            len: len as u32,
        };
        (slice, &mut buf[offset..offset + len])
    }

    /// Reserves `len` bytes without writing them, for later
    /// [`PageArena::insert_at`] once the content is known.
    pub fn reserve(&mut self, len: usize) -> PageSlice {
        let (slice, _) = self.allocate(len);
        slice
    }

    fn return_page(&mut self) {
        if let Some((id, buf)) = self.page.take() {
            self.arena.put_back(id, buf);
        }
    }
}

impl Drop for LocalAllocator {
    fn drop(&mut self) {
        self.return_page();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocation_within_one_page() {
        let arena = Arc::new(PageArena::with_page_size(64));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));

        let (a, _) = alloc.allocate(16);
        let (b, _) = alloc.allocate(24);
        assert_eq!(a, PageSlice { page: 0, offset: 0, len: 16 });
        assert_eq!(b, PageSlice { page: 0, offset: 16, len: 24 });
        assert_eq!(arena.page_count(), 1);
    }

    #[test]
    fn test_page_rollover() {
        let arena = Arc::new(PageArena::with_page_size(32));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));

        alloc.allocate(24);
        let (b, _) = alloc.allocate(16);
        assert_eq!(b.page, 1);
        assert_eq!(b.offset, 0);
        assert_eq!(arena.page_count(), 2);
    }

    #[test]
    fn test_oversized_allocation_gets_dedicated_page() {
        let arena = Arc::new(PageArena::with_page_size(32));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));

        let (big, buf) = alloc.allocate(128);
        assert_eq!(big.len, 128);
        assert_eq!(buf.len(), 128);
    }

    #[test]
    fn test_writes_are_visible_after_finalize() {
        let arena = Arc::new(PageArena::with_page_size(32));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));

        let (slice, buf) = alloc.allocate(8);
        buf.copy_from_slice(&42u64.to_le_bytes());
        drop(alloc);

        let arena = Arc::try_unwrap(arena).unwrap();
        let addresses = arena.into_addresses().unwrap();
        let bytes = addresses[slice.page as usize].bytes().unwrap();
        let start = slice.offset as usize;
        assert_eq!(&bytes[start..start + 8], &42u64.to_le_bytes());
    }

    #[test]
    fn test_finalize_with_outstanding_page_is_an_error() {
        let arena = PageArena::with_page_size(32);
        let (_id, buf) = arena.acquire(8);
        assert!(matches!(arena.into_addresses(), Err(Error::AllocatorInUse)));
        drop(buf);
    }

    #[test]
    fn test_insert_at_resident_page() {
        let arena = Arc::new(PageArena::with_page_size(32));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));
        let slice = alloc.reserve(8);
        drop(alloc); // page becomes resident

        arena.insert_at(slice, &7u64.to_le_bytes()).unwrap();

        let arena = Arc::try_unwrap(arena).unwrap();
        let addresses = arena.into_addresses().unwrap();
        assert_eq!(
            &addresses[0].bytes().unwrap()[..8],
            &7u64.to_le_bytes()
        );
    }

    #[test]
    fn test_insert_at_checked_out_page_is_an_error() {
        let arena = Arc::new(PageArena::with_page_size(32));
        let mut alloc = LocalAllocator::new(Arc::clone(&arena));
        let slice = alloc.reserve(8);

        assert!(matches!(
            arena.insert_at(slice, &[0u8; 8]),
            Err(Error::PageNotResident { page: 0 })
        ));
        drop(alloc);
    }
}
