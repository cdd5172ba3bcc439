//! Exporters to third-party wire layouts.
//!
//! Anything here only needs the compressed centroid view, so external
//! exporters can equally be written against [`TDigest::centroids`] without
//! touching digest internals.

use std::io::{self, Write};

use crate::tdigest::TDigest;

/// Serialize the digest to the ClickHouse `quantileTDigest` aggregate-state
/// layout: a uvarint centroid count followed by (mean f32, weight f32)
/// little-endian pairs.
///
/// See ClickHouse `AggregateFunctions/QuantileTDigest.h`.
pub fn export_to_clickhouse<W: Write>(td: &mut TDigest, w: &mut W) -> io::Result<()> {
    td.process();

    let mut varint = [0u8; 10];
    let n = put_uvarint(&mut varint, td.processed.len() as u64);
    w.write_all(&varint[..n])?;

    for c in td.processed.iter() {
        w.write_all(&(c.mean() as f32).to_le_bytes())?;
        w.write_all(&(c.weight() as f32).to_le_bytes())?;
    }
    Ok(())
}

/// LEB128-encode `x` into `buf`, returning the number of bytes written.
fn put_uvarint(buf: &mut [u8; 10], mut x: u64) -> usize {
    let mut i = 0;
    while x >= 0x80 {
        buf[i] = (x as u8) | 0x80;
        x >>= 7;
        i += 1;
    }
    buf[i] = x as u8;
    i + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_bytes(count: usize) -> Vec<u8> {
        let mut td = TDigest::with_compression(1000.0).unwrap();
        for i in 0..count {
            td.add(i as f64, 1.0);
        }
        let mut buf = Vec::new();
        export_to_clickhouse(&mut td, &mut buf).unwrap();
        buf
    }

    #[test]
    fn uvarint_matches_leb128() {
        let mut buf = [0u8; 10];
        assert_eq!(put_uvarint(&mut buf, 0), 1);
        assert_eq!(buf[0], 0);
        assert_eq!(put_uvarint(&mut buf, 127), 1);
        assert_eq!(buf[0], 127);
        assert_eq!(put_uvarint(&mut buf, 300), 2);
        assert_eq!(&buf[..2], &[0xAC, 0x02]);
        assert_eq!(put_uvarint(&mut buf, u64::MAX), 10);
    }

    #[test]
    fn empty_digest_is_a_single_zero_byte() {
        assert_eq!(export_bytes(0), vec![0]);
    }

    #[test]
    fn one_centroid() {
        assert_eq!(
            export_bytes(1),
            vec![1, 0, 0, 0, 0, 0, 0, 128, 63],
            "expected uvarint 1, mean 0.0f32, weight 1.0f32"
        );
    }

    #[test]
    fn twenty_centroids() {
        let bytes = export_bytes(20);
        assert_eq!(bytes.len(), 1 + 20 * 8);
        assert_eq!(bytes[0], 20);
        for i in 0..20 {
            let at = 1 + i * 8;
            let mean = f32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
            let weight = f32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap());
            assert_eq!(mean, i as f32);
            assert_eq!(weight, 1.0);
        }
    }
}
