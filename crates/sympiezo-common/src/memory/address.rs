//! Owned memory region with exactly-once free semantics.

use crate::utils::error::{Error, Result};

/// An owned allocation with an explicit, exactly-once `free`.
///
/// The Live → Freed transition happens by taking the buffer out of an
/// `Option` behind `&mut self`, so a second free or any access after the
/// free is detected and reported instead of reading released memory.
/// Dropping an `Address` that was never freed releases the buffer as a
/// backstop, but explicit [`free`](Address::free) by the owner is the
/// normal reclamation path.
#[derive(Debug)]
pub struct Address {
    data: Option<Box<[u8]>>,
    size: usize,
}

impl Address {
    /// Wraps an allocated buffer.
    #[must_use]
    pub fn new(data: Box<[u8]>) -> Self {
        let size = data.len();
        Self {
            data: Some(data),
            size,
        }
    }

    /// Size of the allocation in bytes. Stable across the free.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether this allocation has already been freed.
    #[must_use]
    pub fn is_freed(&self) -> bool {
        self.data.is_none()
    }

    /// Read access to the allocation.
    ///
    /// # Errors
    ///
    /// [`Error::UseAfterFree`] if the allocation was freed.
    pub fn bytes(&self) -> Result<&[u8]> {
        self.data
            .as_deref()
            .ok_or(Error::UseAfterFree { size: self.size })
    }

    /// Write access to the allocation.
    ///
    /// # Errors
    ///
    /// [`Error::UseAfterFree`] if the allocation was freed.
    pub fn bytes_mut(&mut self) -> Result<&mut [u8]> {
        self.data
            .as_deref_mut()
            .ok_or(Error::UseAfterFree { size: self.size })
    }

    /// Releases the allocation, returning its size in bytes.
    ///
    /// # Errors
    ///
    /// [`Error::DoubleFree`] if the allocation was already freed. A double
    /// free signals a lifecycle bug in the owner, not a recoverable
    /// condition.
    pub fn free(&mut self) -> Result<usize> {
        match self.data.take() {
            Some(data) => {
                drop(data);
                Ok(self.size)
            }
            None => Err(Error::DoubleFree { size: self.size }),
        }
    }
}
