//! Fixed-width bit packing.
//!
//! Packs runs of u64 values at a uniform bit width, LSB-first within
//! little-endian 64-bit words, crossing word boundaries as needed. A full
//! [`BLOCK_SIZE`] run and a short tail run use the same routine; the
//! decoder only needs the width and the count to invert it exactly.
//!
//! Correctness does not depend on the destination being word aligned: the
//! packer writes whole words where it can and trims the final word to
//! `ceil(leftover_bits / 8)` bytes, so a block of `len` values at width
//! `bits` always occupies exactly `ceil(len * bits / 8)` bytes.

/// Number of values packed with one uniform bit width.
pub const BLOCK_SIZE: usize = 64;

/// Rounds `x` up to the next multiple of 8.
#[inline]
#[must_use]
pub const fn align8(x: usize) -> usize {
    (x + 7) & !7
}

/// The minimum uniform width for a run of values: 0 for an all-zero run,
/// otherwise the bit length of the OR over the run.
#[inline]
#[must_use]
pub fn bits_needed(values: &[u64]) -> u8 {
    let or = values.iter().fold(0u64, |acc, &v| acc | v);
    (u64::BITS - or.leading_zeros()) as u8
}

/// Byte cost of packing `len` values at `bits` width. A full block at
/// width `bits` is exactly `8 * bits` bytes.
#[inline]
#[must_use]
pub const fn packed_bytes(bits: u8, len: usize) -> usize {
    (len * bits as usize + 7) / 8
}

#[inline]
const fn mask(bits: u32) -> u64 {
    if bits == u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Packs `values` at `bits` bits each into `out`, returning the number of
/// bytes written. `bits == 0` writes nothing (an all-zero run).
///
/// Every value must fit in `bits` bits; wider values are an internal bug
/// (the caller computed the width from the same data).
pub fn pack(bits: u8, values: &[u64], out: &mut [u8]) -> usize {
    if bits == 0 || values.is_empty() {
        return 0;
    }
    let bits = u32::from(bits);
    debug_assert!(bits <= u64::BITS);
    let mask = mask(bits);

    let mut word = 0u64;
    let mut shift = 0u32;
    let mut pos = 0usize;
    for &value in values {
        debug_assert_eq!(value & mask, value, "value wider than {bits} bits");
        word |= value << shift;
        shift += bits;
        if shift >= u64::BITS {
            out[pos..pos + 8].copy_from_slice(&word.to_le_bytes());
            pos += 8;
            shift -= u64::BITS;
            word = if shift == 0 {
                0
            } else {
                value >> (bits - shift)
            };
        }
    }
    if shift > 0 {
        let tail = (shift as usize + 7) / 8;
        out[pos..pos + tail].copy_from_slice(&word.to_le_bytes()[..tail]);
        pos += tail;
    }
    debug_assert_eq!(pos, packed_bytes(bits as u8, values.len()));
    pos
}

/// Unpacks `out.len()` values of `bits` bits each from `input`, returning
/// the number of bytes consumed. Exact inverse of [`pack`] for the same
/// width and count.
pub fn unpack(bits: u8, input: &[u8], out: &mut [u64]) -> usize {
    if bits == 0 {
        out.fill(0);
        return 0;
    }
    let bits = u32::from(bits);
    debug_assert!(bits <= u64::BITS);
    let mask = mask(bits);

    let mut pos = 0usize;
    let mut word = read_word(input, 0);
    let mut shift = 0u32;
    for slot in out.iter_mut() {
        let available = u64::BITS - shift;
        let mut value = (word >> shift) & mask;
        if bits <= available {
            shift += bits;
            if shift == u64::BITS {
                pos += 8;
                word = read_word(input, pos);
                shift = 0;
            }
        } else {
            pos += 8;
            word = read_word(input, pos);
            value |= (word << available) & mask;
            shift = bits - available;
        }
        *slot = value;
    }
    packed_bytes(bits as u8, out.len())
}

/// Reads a little-endian word at `pos`, zero-extending past the end of the
/// input. Regions are 8-byte aligned overall, but the final block of a
/// region may end mid-word.
#[inline]
fn read_word(input: &[u8], pos: usize) -> u64 {
    if pos >= input.len() {
        return 0;
    }
    let end = (pos + 8).min(input.len());
    let mut buf = [0u8; 8];
    buf[..end - pos].copy_from_slice(&input[pos..end]);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn roundtrip(bits: u8, values: &[u64]) -> Vec<u64> {
        let mut buf = vec![0u8; packed_bytes(bits, values.len())];
        let written = pack(bits, values, &mut buf);
        assert_eq!(written, buf.len());

        let mut out = vec![0u64; values.len()];
        let consumed = unpack(bits, &buf, &mut out);
        assert_eq!(consumed, written);
        out
    }

    #[test]
    fn test_zero_width_block() {
        let values = [0u64; BLOCK_SIZE];
        let mut buf = [0u8; 8];
        assert_eq!(pack(0, &values, &mut buf), 0);

        let mut out = [7u64; BLOCK_SIZE];
        assert_eq!(unpack(0, &buf, &mut out), 0);
        assert!(out.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_full_block_roundtrip_all_widths() {
        for bits in 1..=64u8 {
            let mask = if bits == 64 { u64::MAX } else { (1 << bits) - 1 };
            let values: Vec<u64> = (0..BLOCK_SIZE as u64)
                .map(|i| (i.wrapping_mul(0x9E3779B97F4A7C15)) & mask)
                .collect();
            assert_eq!(roundtrip(bits, &values), values, "width {bits}");
        }
    }

    #[test]
    fn test_short_tail_roundtrip() {
        for len in 0..BLOCK_SIZE {
            let values: Vec<u64> = (0..len as u64).collect();
            let bits = bits_needed(&values);
            assert_eq!(roundtrip(bits, &values), values, "tail length {len}");
        }
    }

    #[test]
    fn test_bits_needed_is_minimal() {
        assert_eq!(bits_needed(&[]), 0);
        assert_eq!(bits_needed(&[0, 0, 0]), 0);
        assert_eq!(bits_needed(&[1]), 1);
        assert_eq!(bits_needed(&[255]), 8);
        assert_eq!(bits_needed(&[256]), 9);
        assert_eq!(bits_needed(&[3, 12, 1]), 4);
        assert_eq!(bits_needed(&[u64::MAX]), 64);
    }

    #[test]
    fn test_packed_bytes_formula() {
        // a full block of width w is ceil(64 * w / 8) = 8 * w bytes
        for bits in 0..=64u8 {
            assert_eq!(packed_bytes(bits, BLOCK_SIZE), 8 * bits as usize);
        }
        assert_eq!(packed_bytes(3, 2), 1);
        assert_eq!(packed_bytes(13, 5), 9);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(bits in 0u8..=64, raw in proptest::collection::vec(any::<u64>(), 0..200)) {
            let mask = if bits == 0 { 0 } else if bits == 64 { u64::MAX } else { (1 << bits) - 1 };
            let values: Vec<u64> = raw.iter().map(|v| v & mask).collect();
            prop_assert_eq!(roundtrip(bits, &values), values);
        }

        #[test]
        fn prop_width_bound(values in proptest::collection::vec(any::<u64>(), 1..100)) {
            // 2^(w-1) <= max < 2^w for any non-zero run
            let w = u32::from(bits_needed(&values));
            let max = values.iter().copied().max().unwrap();
            if max == 0 {
                prop_assert_eq!(w, 0);
            } else {
                prop_assert!(max >= 1u64.checked_shl(w - 1).unwrap_or(0));
                if w < 64 {
                    prop_assert!(max < (1u64 << w));
                }
            }
        }
    }
}
