//! Error types shared across all Sympiezo crates.
//!
//! Memory lifecycle violations (double free, use after free) are reported as
//! errors so that owners fail fast instead of silently reading released
//! memory. Internal invariant violations are programming errors and are
//! handled with assertions, not with this type.

use thiserror::Error;

/// Errors produced by the compression engine.
#[derive(Debug, Error)]
pub enum Error {
    /// An [`Address`](crate::memory::Address) was freed more than once.
    #[error("double free of a {size} byte allocation")]
    DoubleFree {
        /// Size of the allocation in bytes.
        size: usize,
    },

    /// An [`Address`](crate::memory::Address) was accessed after it was freed.
    #[error("use after free of a {size} byte allocation")]
    UseAfterFree {
        /// Size of the original allocation in bytes.
        size: usize,
    },

    /// A positional write targeted a page that is checked out by a writer.
    #[error("page {page} is not resident")]
    PageNotResident {
        /// The offending page id.
        page: u32,
    },

    /// The page arena was finalized while a worker still held a page.
    #[error("allocator still in use: a worker has not returned its page")]
    AllocatorInUse,

    /// The requested capability is not implemented by this cursor variant.
    ///
    /// Distinct from "not found": callers can pick a capable variant instead
    /// of retrying.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}

/// Result alias used throughout Sympiezo.
pub type Result<T> = std::result::Result<T, Error>;
