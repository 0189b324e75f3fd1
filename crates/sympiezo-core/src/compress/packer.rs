//! Block packing with interchangeable tail strategies.
//!
//! The region layout shared by all strategies:
//!
//! ```text
//! ┌────────────────┬─────┬─────────┬─────────┬─────┬──────────┐
//! │ header (1 byte │ pad │ block 0 │ block 1 │ ... │ tail     │
//! │ width / block) │ →8  │         │         │     │ encoding │
//! └────────────────┴─────┴─────────┴─────────┴─────┴──────────┘
//! ```
//!
//! The header is padded to 8 bytes so packed data starts word aligned, and
//! the whole region is padded to 8 bytes because the bit packer works in
//! terms of words. Only the tail encoding differs between strategies; see
//! [`TailStrategy`].

use smallvec::SmallVec;
use sympiezo_common::{LocalAllocator, PageSlice};

use crate::compress::TailStrategy;
use crate::pack::bitpack::{self, align8, bits_needed, packed_bytes, BLOCK_SIZE};
use crate::pack::varlong;

/// Reusable per-worker scratch for header bytes and the inlined head.
#[derive(Debug, Default)]
pub struct PackScratch {
    header: SmallVec<[u8; 32]>,
}

/// Packs transformed (sorted/aggregated/delta encoded, as configured)
/// values into a freshly allocated region and returns its location.
///
/// `values` must not be empty; zero-degree nodes never reach the packer.
pub fn pack(
    strategy: TailStrategy,
    values: &[u64],
    alloc: &mut LocalAllocator,
    scratch: &mut PackScratch,
) -> PageSlice {
    debug_assert!(!values.is_empty(), "zero-degree lists are not packed");
    match strategy {
        TailStrategy::BlockAligned => pack_block_aligned(values, alloc, scratch),
        TailStrategy::VarLongTail => pack_var_long_tail(values, alloc, scratch),
        TailStrategy::InlinedHead => pack_inlined_head(values, alloc, scratch),
    }
}

/// Every block, including the shorter tail block, is bit-packed at its
/// block's minimum width.
fn pack_block_aligned(
    values: &[u64],
    alloc: &mut LocalAllocator,
    scratch: &mut PackScratch,
) -> PageSlice {
    let header = &mut scratch.header;
    header.clear();
    let mut data_bytes = 0usize;
    for chunk in values.chunks(BLOCK_SIZE) {
        let bits = bits_needed(chunk);
        data_bytes += packed_bytes(bits, chunk.len());
        header.push(bits);
    }

    let header_bytes = align8(header.len());
    let total = align8(header_bytes + data_bytes);
    let (slice, out) = alloc.allocate(total);

    out[..header.len()].copy_from_slice(header);
    let mut pos = header_bytes;
    for (chunk, &bits) in values.chunks(BLOCK_SIZE).zip(header.iter()) {
        pos += bitpack::pack(bits, chunk, &mut out[pos..]);
    }
    debug_assert!(pos <= total, "wrote past the allocated region");
    slice
}

/// Full blocks are bit-packed; the tail values are var-long encoded and
/// carry no header byte.
fn pack_var_long_tail(
    values: &[u64],
    alloc: &mut LocalAllocator,
    scratch: &mut PackScratch,
) -> PageSlice {
    let full = values.len() / BLOCK_SIZE * BLOCK_SIZE;
    let (blocks, tail) = values.split_at(full);

    let header = &mut scratch.header;
    header.clear();
    let mut data_bytes = 0usize;
    for chunk in blocks.chunks(BLOCK_SIZE) {
        let bits = bits_needed(chunk);
        data_bytes += packed_bytes(bits, BLOCK_SIZE);
        header.push(bits);
    }
    let tail_bytes = varlong::encoded_slice_size(tail);

    let header_bytes = align8(header.len());
    let total = align8(header_bytes + data_bytes + tail_bytes);
    let (slice, out) = alloc.allocate(total);

    out[..header.len()].copy_from_slice(header);
    let mut pos = header_bytes;
    for (chunk, &bits) in blocks.chunks(BLOCK_SIZE).zip(header.iter()) {
        pos += bitpack::pack(bits, chunk, &mut out[pos..]);
    }
    pos += varlong::encode_slice(tail, &mut out[pos..]);
    debug_assert!(pos <= total, "wrote past the allocated region");
    slice
}

/// The first value is var-long encoded into the header region; the rest
/// are packed as in [`pack_block_aligned`].
///
/// After delta encoding, the first value is the absolute head id while
/// everything after it is a small difference, so excluding it keeps the
/// first block's width at delta scale. No ordering assumption is made
/// beyond that: the head is excluded from the width computation
/// unconditionally, which is correct for any input.
fn pack_inlined_head(
    values: &[u64],
    alloc: &mut LocalAllocator,
    scratch: &mut PackScratch,
) -> PageSlice {
    let head = values[0];
    let rest = &values[1..];

    let header = &mut scratch.header;
    header.clear();
    let mut data_bytes = 0usize;
    for chunk in rest.chunks(BLOCK_SIZE) {
        let bits = bits_needed(chunk);
        data_bytes += packed_bytes(bits, chunk.len());
        header.push(bits);
    }
    let head_bytes = varlong::encoded_size(head);

    let header_bytes = align8(header.len() + head_bytes);
    let total = align8(header_bytes + data_bytes);
    let (slice, out) = alloc.allocate(total);

    out[..header.len()].copy_from_slice(header);
    varlong::encode(head, &mut out[header.len()..]);
    let mut pos = header_bytes;
    for (chunk, &bits) in rest.chunks(BLOCK_SIZE).zip(header.iter()) {
        pos += bitpack::pack(bits, chunk, &mut out[pos..]);
    }
    debug_assert!(pos <= total, "wrote past the allocated region");
    slice
}
