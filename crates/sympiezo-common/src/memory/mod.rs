//! Paged memory management.
//!
//! Compressed adjacency data lives in large shared pages instead of one
//! allocation per node. The pieces fit together like this:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ PageArena (shared, lock-protected page list)            │
//! │   page 0        page 1        page 2        page 3      │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌───────────┐   │
//! │  │ n0 n1 n2│  │ n3 n4   │  │ n5 n6 n7│  │ oversized │   │
//! │  └─────────┘  └─────────┘  └─────────┘  └───────────┘   │
//! │     ▲ checked out by worker A  ▲ worker B               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Each parallel worker owns a [`LocalAllocator`] that bump-allocates node
//! regions within a private page; the only cross-thread synchronization is
//! the page acquisition in [`PageArena`], which happens once per page, not
//! once per node. After construction, pages become [`Address`] handles that
//! are freed exactly once when the owning list is released.

mod address;
mod arena;

pub use address::Address;
pub use arena::{LocalAllocator, PageArena, PageSlice, PAGE_SIZE};
