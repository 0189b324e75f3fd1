//! Variable-length integer encoding.
//!
//! Seven payload bits per byte, least significant group first; the high
//! bit marks a continuation. Small values cost one byte, a full u64 costs
//! ten. Used for tail values that would not amortize a block header, for
//! the inlined head value, and (zigzagged) for signed property deltas.

/// Encoded size of one value in bytes (1..=10).
#[inline]
#[must_use]
pub fn encoded_size(value: u64) -> usize {
    let bits = (u64::BITS - value.leading_zeros()).max(1) as usize;
    (bits + 6) / 7
}

/// Encoded size of a run of values.
#[must_use]
pub fn encoded_slice_size(values: &[u64]) -> usize {
    values.iter().map(|&v| encoded_size(v)).sum()
}

/// Encodes `value` into `out`, returning the number of bytes written.
pub fn encode(mut value: u64, out: &mut [u8]) -> usize {
    let mut pos = 0usize;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            out[pos] = byte;
            return pos + 1;
        }
        out[pos] = byte | 0x80;
        pos += 1;
    }
}

/// Encodes a run of values back to back, returning the bytes written.
pub fn encode_slice(values: &[u64], out: &mut [u8]) -> usize {
    let mut pos = 0usize;
    for &value in values {
        pos += encode(value, &mut out[pos..]);
    }
    pos
}

/// Decodes one value from the front of `input`, returning it together with
/// the number of bytes consumed.
#[must_use]
pub fn decode(input: &[u8]) -> (u64, usize) {
    let mut value = 0u64;
    let mut shift = 0u32;
    let mut pos = 0usize;
    loop {
        let byte = input[pos];
        pos += 1;
        value |= u64::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            return (value, pos);
        }
        shift += 7;
    }
}

/// Decodes `out.len()` consecutive values, returning the bytes consumed.
pub fn decode_slice(input: &[u8], out: &mut [u64]) -> usize {
    let mut pos = 0usize;
    for slot in out.iter_mut() {
        let (value, consumed) = decode(&input[pos..]);
        *slot = value;
        pos += consumed;
    }
    pos
}

/// Maps a signed value to an unsigned one with a small magnitude for small
/// absolute values: 0, -1, 1, -2, 2, ... become 0, 1, 2, 3, 4, ...
#[inline]
#[must_use]
pub fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag`].
#[inline]
#[must_use]
pub fn unzigzag(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
