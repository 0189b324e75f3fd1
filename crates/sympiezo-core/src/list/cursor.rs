//! Decompression cursors over packed regions.
//!
//! A cursor decodes one block at a time into a stack scratch buffer and
//! streams values out of it, so iteration never materializes the whole
//! list. The prefix sum that inverts delta encoding is applied per value
//! as it leaves the scratch buffer.

use sympiezo_common::{Error, Result};

use crate::compress::TailStrategy;
use crate::pack::bitpack::{self, align8, BLOCK_SIZE};
use crate::pack::varlong;

/// Streaming read access to one node's adjacency list.
pub trait AdjacencyCursor {
    /// Total number of values the cursor will produce.
    fn size(&self) -> usize;

    /// Values not yet produced.
    fn remaining(&self) -> usize;

    fn has_next(&self) -> bool {
        self.remaining() > 0
    }

    /// Produces the next value.
    fn next(&mut self) -> Option<u64>;

    /// The value [`next`](Self::next) would produce, without consuming it.
    fn peek(&mut self) -> Option<u64>;

    /// Consumes values up to and including the first one strictly greater
    /// than `target`, returning it. Meaningful on sorted lists.
    fn skip_until(&mut self, target: u64) -> Option<u64>;

    /// Consumes values up to and including the first one greater than or
    /// equal to `target`, returning it. Meaningful on sorted lists.
    fn advance(&mut self, target: u64) -> Option<u64>;

    /// Skips the next `n` values and returns the one after them.
    ///
    /// # Errors
    ///
    /// [`Error::Unsupported`] for layouts without per-block headers over
    /// the tail, where skipped values cannot be delimited without decoding.
    fn advance_by(&mut self, n: usize) -> Result<Option<u64>>;
}

/// One tail strategy's block decoding, driven by [`DeltaCursor`].
pub trait BlockDecoder {
    /// Whether every run of values is delimited by a width header, which
    /// is what index-based skipping needs.
    const BLOCK_ADDRESSABLE: bool;

    /// Decodes the next run of values into `out`, returning how many were
    /// produced. `remaining` is the number of values not yet decoded.
    fn decompress_block(&mut self, out: &mut [u64; BLOCK_SIZE], remaining: usize) -> usize;
}

/// Decoder for regions where every block, tail included, is bit-packed
/// behind a width header byte.
#[derive(Debug)]
pub struct BlockAlignedDecoder<'a> {
    bytes: &'a [u8],
    header_idx: usize,
    data_pos: usize,
}

impl<'a> BlockAlignedDecoder<'a> {
    fn new(bytes: &'a [u8], degree: usize) -> Self {
        let header_len = degree.div_ceil(BLOCK_SIZE);
        Self {
            bytes,
            header_idx: 0,
            data_pos: align8(header_len),
        }
    }
}

impl BlockDecoder for BlockAlignedDecoder<'_> {
    const BLOCK_ADDRESSABLE: bool = true;

    fn decompress_block(&mut self, out: &mut [u64; BLOCK_SIZE], remaining: usize) -> usize {
        let bits = self.bytes[self.header_idx];
        self.header_idx += 1;
        let len = remaining.min(BLOCK_SIZE);
        self.data_pos += bitpack::unpack(bits, &self.bytes[self.data_pos..], &mut out[..len]);
        len
    }
}

/// Decoder for regions where only full blocks carry a width header and the
/// tail is a headerless var-long run.
#[derive(Debug)]
pub struct VarLongTailDecoder<'a> {
    bytes: &'a [u8],
    header_idx: usize,
    full_blocks: usize,
    data_pos: usize,
}

impl<'a> VarLongTailDecoder<'a> {
    fn new(bytes: &'a [u8], degree: usize) -> Self {
        let full_blocks = degree / BLOCK_SIZE;
        Self {
            bytes,
            header_idx: 0,
            full_blocks,
            data_pos: align8(full_blocks),
        }
    }
}

impl BlockDecoder for VarLongTailDecoder<'_> {
    const BLOCK_ADDRESSABLE: bool = false;

    fn decompress_block(&mut self, out: &mut [u64; BLOCK_SIZE], remaining: usize) -> usize {
        if self.header_idx < self.full_blocks {
            let bits = self.bytes[self.header_idx];
            self.header_idx += 1;
            self.data_pos += bitpack::unpack(bits, &self.bytes[self.data_pos..], out);
            BLOCK_SIZE
        } else {
            debug_assert!(remaining < BLOCK_SIZE);
            self.data_pos += varlong::decode_slice(&self.bytes[self.data_pos..], &mut out[..remaining]);
            remaining
        }
    }
}

/// Decoder for regions whose first value is var-long encoded into the
/// header region, with the rest packed as in [`BlockAlignedDecoder`].
#[derive(Debug)]
pub struct InlinedHeadDecoder<'a> {
    bytes: &'a [u8],
    head: Option<u64>,
    header_idx: usize,
    data_pos: usize,
}

impl<'a> InlinedHeadDecoder<'a> {
    fn new(bytes: &'a [u8], degree: usize) -> Self {
        let header_len = (degree - 1).div_ceil(BLOCK_SIZE);
        let (head, consumed) = varlong::decode(&bytes[header_len..]);
        Self {
            bytes,
            head: Some(head),
            header_idx: 0,
            data_pos: align8(header_len + consumed),
        }
    }
}

impl BlockDecoder for InlinedHeadDecoder<'_> {
    const BLOCK_ADDRESSABLE: bool = true;

    fn decompress_block(&mut self, out: &mut [u64; BLOCK_SIZE], remaining: usize) -> usize {
        if let Some(head) = self.head.take() {
            out[0] = head;
            return 1;
        }
        let bits = self.bytes[self.header_idx];
        self.header_idx += 1;
        let len = remaining.min(BLOCK_SIZE);
        self.data_pos += bitpack::unpack(bits, &self.bytes[self.data_pos..], &mut out[..len]);
        len
    }
}

/// Streams values out of a packed region, one decoded block at a time,
/// undoing delta encoding with a running prefix sum when configured.
#[derive(Debug)]
pub struct DeltaCursor<D> {
    decoder: D,
    block: [u64; BLOCK_SIZE],
    idx: usize,
    block_len: usize,
    size: usize,
    remaining: usize,
    last: u64,
    delta: bool,
}

impl<D: BlockDecoder> DeltaCursor<D> {
    fn new(decoder: D, size: usize, delta: bool) -> Self {
        debug_assert!(size > 0, "empty lists use the empty cursor variant");
        let mut cursor = Self {
            decoder,
            block: [0; BLOCK_SIZE],
            idx: 0,
            block_len: 0,
            size,
            remaining: size,
            last: 0,
            delta,
        };
        cursor.load_block();
        cursor
    }

    fn load_block(&mut self) {
        // values still packed = values not yet produced; the scratch
        // buffer is fully drained before a reload
        self.block_len = self.decoder.decompress_block(&mut self.block, self.remaining);
        self.idx = 0;
    }
}

impl<D: BlockDecoder> AdjacencyCursor for DeltaCursor<D> {
    fn size(&self) -> usize {
        self.size
    }

    fn remaining(&self) -> usize {
        self.remaining
    }

    fn next(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        if self.idx == self.block_len {
            self.load_block();
        }
        let mut value = self.block[self.idx];
        self.idx += 1;
        self.remaining -= 1;
        if self.delta {
            value = self.last.wrapping_add(value);
        }
        self.last = value;
        Some(value)
    }

    fn peek(&mut self) -> Option<u64> {
        if self.remaining == 0 {
            return None;
        }
        if self.idx == self.block_len {
            self.load_block();
        }
        let value = self.block[self.idx];
        Some(if self.delta {
            self.last.wrapping_add(value)
        } else {
            value
        })
    }

    fn skip_until(&mut self, target: u64) -> Option<u64> {
        while let Some(value) = self.next() {
            if value > target {
                return Some(value);
            }
        }
        None
    }

    fn advance(&mut self, target: u64) -> Option<u64> {
        while let Some(value) = self.next() {
            if value >= target {
                return Some(value);
            }
        }
        None
    }

    fn advance_by(&mut self, n: usize) -> Result<Option<u64>> {
        if !D::BLOCK_ADDRESSABLE {
            return Err(Error::Unsupported("advance_by over a var-long tail"));
        }
        for _ in 0..n {
            if self.next().is_none() {
                return Ok(None);
            }
        }
        Ok(self.next())
    }
}

/// Cursor over one node's packed region, dispatching on the tail strategy
/// the list was built with.
#[derive(Debug)]
pub enum PackedCursor<'a> {
    /// Zero-degree node with no backing region.
    Empty,
    BlockAligned(DeltaCursor<BlockAlignedDecoder<'a>>),
    VarLongTail(DeltaCursor<VarLongTailDecoder<'a>>),
    InlinedHead(DeltaCursor<InlinedHeadDecoder<'a>>),
}

impl<'a> PackedCursor<'a> {
    /// Opens a cursor over `bytes`, which must be the region produced by
    /// the same strategy for a list of `degree` values.
    #[must_use]
    pub fn new(strategy: TailStrategy, bytes: &'a [u8], degree: usize, delta: bool) -> Self {
        if degree == 0 {
            return Self::Empty;
        }
        match strategy {
            TailStrategy::BlockAligned => Self::BlockAligned(DeltaCursor::new(
                BlockAlignedDecoder::new(bytes, degree),
                degree,
                delta,
            )),
            TailStrategy::VarLongTail => Self::VarLongTail(DeltaCursor::new(
                VarLongTailDecoder::new(bytes, degree),
                degree,
                delta,
            )),
            TailStrategy::InlinedHead => Self::InlinedHead(DeltaCursor::new(
                InlinedHeadDecoder::new(bytes, degree),
                degree,
                delta,
            )),
        }
    }
}

impl AdjacencyCursor for PackedCursor<'_> {
    fn size(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::BlockAligned(cursor) => cursor.size(),
            Self::VarLongTail(cursor) => cursor.size(),
            Self::InlinedHead(cursor) => cursor.size(),
        }
    }

    fn remaining(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::BlockAligned(cursor) => cursor.remaining(),
            Self::VarLongTail(cursor) => cursor.remaining(),
            Self::InlinedHead(cursor) => cursor.remaining(),
        }
    }

    fn next(&mut self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::BlockAligned(cursor) => cursor.next(),
            Self::VarLongTail(cursor) => cursor.next(),
            Self::InlinedHead(cursor) => cursor.next(),
        }
    }

    fn peek(&mut self) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::BlockAligned(cursor) => cursor.peek(),
            Self::VarLongTail(cursor) => cursor.peek(),
            Self::InlinedHead(cursor) => cursor.peek(),
        }
    }

    fn skip_until(&mut self, target: u64) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::BlockAligned(cursor) => cursor.skip_until(target),
            Self::VarLongTail(cursor) => cursor.skip_until(target),
            Self::InlinedHead(cursor) => cursor.skip_until(target),
        }
    }

    fn advance(&mut self, target: u64) -> Option<u64> {
        match self {
            Self::Empty => None,
            Self::BlockAligned(cursor) => cursor.advance(target),
            Self::VarLongTail(cursor) => cursor.advance(target),
            Self::InlinedHead(cursor) => cursor.advance(target),
        }
    }

    fn advance_by(&mut self, n: usize) -> Result<Option<u64>> {
        match self {
            Self::Empty => Ok(None),
            Self::BlockAligned(cursor) => cursor.advance_by(n),
            Self::VarLongTail(cursor) => cursor.advance_by(n),
            Self::InlinedHead(cursor) => cursor.advance_by(n),
        }
    }
}
