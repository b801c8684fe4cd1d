//! CRC-16 integrity checksum guarding each datagram.
//!
//! CRC-16/CCITT-FALSE: polynomial `0x1021`, initial value `0xFFFF`, no
//! reflection, no final xor.

use std::ops::Range;

const POLY: u16 = 0x1021;
const INIT: u16 = 0xFFFF;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

fn update(mut crc: u16, data: &[u8]) -> u16 {
    for &byte in data {
        let idx = ((crc >> 8) as u8 ^ byte) as usize;
        crc = (crc << 8) ^ TABLE[idx];
    }
    crc
}

/// Computes the checksum of `data`.
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    update(INIT, data)
}

/// Computes the checksum of `data` with the bytes in `excluded` skipped.
///
/// The excluded range is clamped to the slice, so an out-of-range exclusion
/// never panics.
#[must_use]
pub fn crc16_excluding(data: &[u8], excluded: Range<usize>) -> u16 {
    let start = excluded.start.min(data.len());
    let end = excluded.end.clamp(start, data.len());
    let crc = update(INIT, &data[..start]);
    update(crc, &data[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(crc16(b"123456789"), 0x29B1);
    }

    #[test]
    fn empty_is_init() {
        assert_eq!(crc16(&[]), 0xFFFF);
    }

    #[test]
    fn excluding_matches_manual_concatenation() {
        let data = b"abcdefghij";
        let mut joined = data[..3].to_vec();
        joined.extend_from_slice(&data[5..]);
        assert_eq!(crc16_excluding(data, 3..5), crc16(&joined));
    }

    #[test]
    fn excluded_bytes_do_not_matter() {
        let mut a = [7u8; 16];
        let mut b = [7u8; 16];
        a[8] = 0x12;
        a[9] = 0x34;
        b[8] = 0xAB;
        b[9] = 0xCD;
        assert_eq!(crc16_excluding(&a, 8..10), crc16_excluding(&b, 8..10));
        assert_ne!(crc16(&a), crc16(&b));
    }

    #[test]
    fn excluding_out_of_range_is_clamped() {
        let data = [1u8, 2, 3];
        assert_eq!(crc16_excluding(&data, 8..10), crc16(&data));
        assert_eq!(crc16_excluding(&data, 2..10), crc16(&data[..2]));
    }

    #[test]
    fn table_matches_bitwise() {
        fn bitwise(data: &[u8]) -> u16 {
            let mut crc = INIT;
            for &byte in data {
                crc ^= u16::from(byte) << 8;
                for _ in 0..8 {
                    crc = if crc & 0x8000 != 0 {
                        (crc << 1) ^ POLY
                    } else {
                        crc << 1
                    };
                }
            }
            crc
        }
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(crc16(&data), bitwise(&data));
    }
}
