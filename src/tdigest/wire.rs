// Native TDigest binary wire codec.
//
// Layout (little-endian, tightly packed, no padding):
//
//   magic        i16   0x0C80
//   version      i32   1
//   compression  f64
//   n_processed  i32   0..=2^20
//   processed    n_processed × (weight f64, mean f64)
//   n_cumulative i32   0..=2^20
//   cumulative   n_cumulative × f64
//   decay_count  i32
//   decay_every  i32
//   decay_value  f64
//   count        i64
//   min          f64
//   max          f64
//
// Encoding forces a compression pass first, so the payload always captures a
// compressed state. Decoding validates every field; any failure aborts the
// whole decode. The scale function is a construction parameter, not part of
// the wire image; decode restores the default.

use std::fmt;

use crate::tdigest::centroids::{Centroid, CentroidList};
use crate::tdigest::scale::ScaleFamily;
use crate::tdigest::TDigest;

const MAGIC: i16 = 0x0C80;
const VERSION: i32 = 1;
const MAX_SEQUENCE: i32 = 1 << 20;

#[derive(Debug, Clone, PartialEq)]
pub enum WireError {
    CorruptMagic(i16),
    CorruptVersion(i32),
    CorruptCompression(f64),
    /// A sequence length outside `0..=2^20`, or a negative centroid weight.
    CorruptCount(f64),
    CorruptNaN(&'static str),
    CorruptInf(&'static str),
    /// Centroid at this index has a lower mean than its predecessor.
    CorruptOrder(usize),
    /// Accumulating this weight pushes the total past `i64::MAX`.
    CorruptOverflow(f64),
    CorruptTrailingBytes(usize),
    TruncatedInput(&'static str),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use WireError::*;
        match self {
            CorruptMagic(m) => write!(
                f,
                "data corruption detected: invalid header magic value 0x{:04x}",
                m
            ),
            CorruptVersion(v) => {
                write!(f, "data corruption detected: invalid encoding version {v}")
            }
            CorruptCompression(c) => write!(
                f,
                "data corruption detected: compression must be positive and finite, have {c}"
            ),
            CorruptCount(n) => write!(
                f,
                "data corruption detected: invalid count {n}, must be within 0..=2^20"
            ),
            CorruptNaN(what) => {
                write!(f, "data corruption detected: NaN {what} not permitted")
            }
            CorruptInf(what) => {
                write!(f, "data corruption detected: Inf {what} not permitted")
            }
            CorruptOrder(i) => write!(
                f,
                "data corruption detected: centroid {i} has a lower mean than its predecessor"
            ),
            CorruptOverflow(w) => write!(
                f,
                "data corruption detected: centroid weight {w} overflows the total"
            ),
            CorruptTrailingBytes(n) => {
                write!(f, "found {n} unexpected bytes trailing the digest")
            }
            TruncatedInput(what) => write!(f, "unexpected end of input reading {what}"),
        }
    }
}

impl std::error::Error for WireError {}

pub type WireResult<T> = Result<T, WireError>;

/* ============================
 * Small helpers
 * ============================ */

#[inline]
fn write_i16(buf: &mut Vec<u8>, v: i16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
fn write_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
fn write_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

#[inline]
fn take<const N: usize>(
    bytes: &[u8],
    offset: &mut usize,
    what: &'static str,
) -> WireResult<[u8; N]> {
    let end = offset
        .checked_add(N)
        .filter(|&end| end <= bytes.len())
        .ok_or(WireError::TruncatedInput(what))?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes[*offset..end]);
    *offset = end;
    Ok(arr)
}

#[inline]
fn read_i16(bytes: &[u8], offset: &mut usize, what: &'static str) -> WireResult<i16> {
    take::<2>(bytes, offset, what).map(i16::from_le_bytes)
}

#[inline]
fn read_i32(bytes: &[u8], offset: &mut usize, what: &'static str) -> WireResult<i32> {
    take::<4>(bytes, offset, what).map(i32::from_le_bytes)
}

#[inline]
fn read_i64(bytes: &[u8], offset: &mut usize, what: &'static str) -> WireResult<i64> {
    take::<8>(bytes, offset, what).map(i64::from_le_bytes)
}

#[inline]
fn read_f64(bytes: &[u8], offset: &mut usize, what: &'static str) -> WireResult<f64> {
    take::<8>(bytes, offset, what).map(f64::from_le_bytes)
}

/* ============================
 * Encode
 * ============================ */

/// Serialize the digest, forcing a compression pass first.
pub fn encode_digest(td: &mut TDigest) -> Vec<u8> {
    td.process();

    let n = td.processed.len();
    let m = td.cumulative.len();
    let mut buf = Vec::with_capacity(2 + 4 + 8 + 4 + 16 * n + 4 + 8 * m + 4 + 4 + 8 + 8 + 8 + 8);

    write_i16(&mut buf, MAGIC);
    write_i32(&mut buf, VERSION);
    write_f64(&mut buf, td.compression);
    write_i32(&mut buf, n as i32);
    for c in td.processed.iter() {
        write_f64(&mut buf, c.weight());
        write_f64(&mut buf, c.mean());
    }
    write_i32(&mut buf, m as i32);
    for &v in &td.cumulative {
        write_f64(&mut buf, v);
    }
    write_i32(&mut buf, td.decay_count);
    write_i32(&mut buf, td.decay_every);
    write_f64(&mut buf, td.decay_value);
    write_i64(&mut buf, td.count);
    write_f64(&mut buf, td.min);
    write_f64(&mut buf, td.max);

    buf
}

/* ============================
 * Decode
 * ============================ */

/// Reconstruct a digest from its wire image, validating every field.
pub fn decode_digest(bytes: &[u8]) -> WireResult<TDigest> {
    let mut offset = 0;

    let magic = read_i16(bytes, &mut offset, "magic header")?;
    if magic != MAGIC {
        return Err(WireError::CorruptMagic(magic));
    }
    let version = read_i32(bytes, &mut offset, "encoding version")?;
    if version != VERSION {
        return Err(WireError::CorruptVersion(version));
    }
    let compression = read_f64(bytes, &mut offset, "compression")?;
    if !compression.is_finite() || compression <= 0.0 {
        return Err(WireError::CorruptCompression(compression));
    }
    let max_processed = (2.0 * compression).ceil() as usize;
    let max_unprocessed = (8.0 * compression).ceil() as usize;
    // Capacity hints only; clamped so a crafted compression value cannot
    // force an enormous allocation before validation completes.
    let processed_cap = max_processed.min(MAX_SEQUENCE as usize);
    let unprocessed_cap = max_unprocessed.min(MAX_SEQUENCE as usize);

    let n = read_i32(bytes, &mut offset, "centroid count")?;
    if !(0..=MAX_SEQUENCE).contains(&n) {
        return Err(WireError::CorruptCount(n as f64));
    }
    let n = n as usize;
    let mut processed = CentroidList::with_capacity(processed_cap.max(n));
    let mut processed_weight = 0.0;
    let mut prev_mean = f64::NEG_INFINITY;
    for i in 0..n {
        let weight = read_f64(bytes, &mut offset, "centroid weight")?;
        let mean = read_f64(bytes, &mut offset, "centroid mean")?;
        if weight < 0.0 {
            return Err(WireError::CorruptCount(weight));
        }
        if mean.is_nan() {
            return Err(WireError::CorruptNaN("centroid mean"));
        }
        if mean.is_infinite() {
            return Err(WireError::CorruptInf("centroid mean"));
        }
        if mean < prev_mean {
            return Err(WireError::CorruptOrder(i));
        }
        prev_mean = mean;
        if weight > i64::MAX as f64 - processed_weight {
            return Err(WireError::CorruptOverflow(weight));
        }
        processed_weight += weight;
        processed.push(Centroid::new(mean, weight));
    }

    let m = read_i32(bytes, &mut offset, "cumulative count")?;
    if !(0..=MAX_SEQUENCE).contains(&m) {
        return Err(WireError::CorruptCount(m as f64));
    }
    let m = m as usize;
    // A compressed digest always carries one cumulative entry per centroid
    // plus the trailing total, or none at all; anything else would send the
    // query engine out of bounds.
    if m != 0 && m != n + 1 {
        return Err(WireError::CorruptCount(m as f64));
    }
    let mut cumulative = Vec::with_capacity(m.max(processed_cap + 1));
    for _ in 0..m {
        let v = read_f64(bytes, &mut offset, "cumulative value")?;
        if v.is_nan() {
            return Err(WireError::CorruptNaN("cumulative value"));
        }
        if v.is_infinite() {
            return Err(WireError::CorruptInf("cumulative value"));
        }
        cumulative.push(v);
    }

    let decay_count = read_i32(bytes, &mut offset, "decay counter")?;
    let decay_every = read_i32(bytes, &mut offset, "decay interval")?;
    let decay_value = read_f64(bytes, &mut offset, "decay value")?;
    let count = read_i64(bytes, &mut offset, "observation count")?;
    let min = read_f64(bytes, &mut offset, "minimum")?;
    let max = read_f64(bytes, &mut offset, "maximum")?;

    if offset != bytes.len() {
        return Err(WireError::CorruptTrailingBytes(bytes.len() - offset));
    }

    Ok(TDigest {
        compression,
        scale: ScaleFamily::default(),
        max_processed,
        max_unprocessed,
        processed,
        unprocessed: CentroidList::with_capacity(unprocessed_cap + 1),
        cumulative,
        processed_weight,
        unprocessed_weight: 0.0,
        min,
        max,
        count,
        decay_value,
        decay_every,
        decay_count,
    })
}

impl TDigest {
    /// Convenience wrapper over [`encode_digest`].
    #[inline]
    pub fn to_bytes(&mut self) -> Vec<u8> {
        encode_digest(self)
    }

    /// Convenience wrapper over [`decode_digest`].
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> WireResult<TDigest> {
        decode_digest(bytes)
    }
}
