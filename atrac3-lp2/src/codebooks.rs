// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The eight Huffman code tables of the ATRAC3 format.
//!
//! Table 0 is empty: a spectral subband selecting it carries no data. Table 1 decodes value
//! *pairs* for both tonal and spectral data (see `tables::VLC_PAIR_VALUES`). Tables 2 through 7
//! decode signed mantissas directly.

use atrac3_core::io::huffman::{HuffmanEntry, HuffmanTable};

const fn huff(len: u8, code: u8, symbol: i8) -> HuffmanEntry {
    HuffmanEntry { len, code, symbol }
}

#[rustfmt::skip]
static TABLE_1: [HuffmanEntry; 9] = [
    huff(1, 0, 0), huff(3, 4, 1), huff(3, 5, 2), huff(4, 12, 3), huff(4, 13, 4),
    huff(5, 28, 5), huff(5, 29, 6), huff(5, 30, 7), huff(5, 31, 8),
];

#[rustfmt::skip]
static TABLE_2: [HuffmanEntry; 5] = [
    huff(1, 0, 0), huff(3, 4, 1), huff(3, 5, -1), huff(3, 6, 2), huff(3, 7, -2),
];

#[rustfmt::skip]
static TABLE_3: [HuffmanEntry; 7] = [
    huff(1, 0, 0), huff(3, 4, 1), huff(3, 5, -1), huff(4, 12, 2), huff(4, 13, -2),
    huff(4, 14, 3), huff(4, 15, -3),
];

#[rustfmt::skip]
static TABLE_4: [HuffmanEntry; 9] = [
    huff(1, 0, 0), huff(3, 4, 1), huff(3, 5, -1), huff(4, 12, 2), huff(4, 13, -2),
    huff(5, 28, 3), huff(5, 29, -3), huff(5, 30, 4), huff(5, 31, -4),
];

#[rustfmt::skip]
static TABLE_5: [HuffmanEntry; 15] = [
    huff(2, 0, 0), huff(3, 2, 1), huff(3, 3, -1), huff(4, 8, 2), huff(4, 9, -2),
    huff(4, 10, 3), huff(4, 11, -3), huff(4, 12, 7), huff(4, 13, -7), huff(5, 28, 4),
    huff(5, 29, -4), huff(6, 60, 5), huff(6, 61, -5), huff(6, 62, 6), huff(6, 63, -6),
];

#[rustfmt::skip]
static TABLE_6: [HuffmanEntry; 31] = [
    huff(3, 0, 0), huff(4, 2, 1), huff(4, 3, -1), huff(4, 4, 2), huff(4, 5, -2),
    huff(4, 6, 3), huff(4, 7, -3), huff(4, 8, 15), huff(4, 9, -15), huff(5, 20, 4),
    huff(5, 21, -4), huff(5, 22, 5), huff(5, 23, -5), huff(5, 24, 6), huff(5, 25, -6),
    huff(6, 52, 7), huff(6, 53, -7), huff(6, 54, 8), huff(6, 55, -8), huff(6, 56, 9),
    huff(6, 57, -9), huff(6, 58, 10), huff(6, 59, -10), huff(7, 120, 11), huff(7, 121, -11),
    huff(7, 122, 12), huff(7, 123, -12), huff(7, 124, 13), huff(7, 125, -13), huff(7, 126, 14),
    huff(7, 127, -14),
];

#[rustfmt::skip]
static TABLE_7: [HuffmanEntry; 63] = [
    huff(3, 0, 0), huff(4, 2, 31), huff(4, 3, -31), huff(5, 8, 1), huff(5, 9, -1),
    huff(5, 10, 2), huff(5, 11, -2), huff(5, 12, 3), huff(5, 13, -3), huff(5, 14, 4),
    huff(5, 15, -4), huff(5, 16, 5), huff(5, 17, -5), huff(6, 36, 6), huff(6, 37, -6),
    huff(6, 38, 7), huff(6, 39, -7), huff(6, 40, 8), huff(6, 41, -8), huff(6, 42, 9),
    huff(6, 43, -9), huff(6, 44, 10), huff(6, 45, -10), huff(6, 46, 11), huff(6, 47, -11),
    huff(6, 48, 12), huff(6, 49, -12), huff(6, 50, 13), huff(6, 51, -13), huff(7, 104, 14),
    huff(7, 105, -14), huff(7, 106, 15), huff(7, 107, -15), huff(7, 108, 16), huff(7, 109, -16),
    huff(7, 110, 17), huff(7, 111, -17), huff(7, 112, 18), huff(7, 113, -18), huff(7, 114, 19),
    huff(7, 115, -19), huff(7, 116, 20), huff(7, 117, -20), huff(8, 236, 21), huff(8, 237, -21),
    huff(8, 238, 22), huff(8, 239, -22), huff(8, 240, 23), huff(8, 241, -23), huff(8, 242, 24),
    huff(8, 243, -24), huff(8, 244, 25), huff(8, 245, -25), huff(8, 246, 26), huff(8, 247, -26),
    huff(8, 248, 27), huff(8, 249, -27), huff(8, 250, 28), huff(8, 251, -28), huff(8, 252, 29),
    huff(8, 253, -29), huff(8, 254, 30), huff(8, 255, -30),
];

/// The code tables indexed by table selector. Index 0 is the empty "skipped band" table.
pub static HUFFMAN_TABLES: [HuffmanTable; 8] = [
    HuffmanTable::new(&[]),
    HuffmanTable::new(&TABLE_1),
    HuffmanTable::new(&TABLE_2),
    HuffmanTable::new(&TABLE_3),
    HuffmanTable::new(&TABLE_4),
    HuffmanTable::new(&TABLE_5),
    HuffmanTable::new(&TABLE_6),
    HuffmanTable::new(&TABLE_7),
];

#[cfg(test)]
mod tests {
    use super::HUFFMAN_TABLES;
    use atrac3_core::io::BitReader;

    #[test]
    fn verify_codes_are_well_formed() {
        for (n, table) in HUFFMAN_TABLES.iter().enumerate() {
            for entry in table.entries() {
                assert!(entry.len >= 1 && entry.len <= 8, "table {}: bad length", n);
                assert!(
                    u32::from(entry.code) < (1u32 << entry.len),
                    "table {}: code wider than its length",
                    n
                );
            }
        }
    }

    #[test]
    fn verify_codes_are_distinct_and_prefix_free() {
        for (n, table) in HUFFMAN_TABLES.iter().enumerate() {
            let entries = table.entries();
            for (i, a) in entries.iter().enumerate() {
                for b in entries.iter().skip(i + 1) {
                    assert!(
                        a.len != b.len || a.code != b.code,
                        "table {}: duplicate code ({}, {:#x})",
                        n, a.len, a.code
                    );
                    // No codeword may be a proper prefix of a longer one.
                    if a.len < b.len {
                        assert!(
                            b.code >> (b.len - a.len) != a.code,
                            "table {}: ({}, {:#x}) is a prefix of ({}, {:#x})",
                            n, a.len, a.code, b.len, b.code
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn verify_every_symbol_decodes() {
        // Each declared codeword, fed back through the bitstream, must decode to its symbol.
        for table in HUFFMAN_TABLES.iter().filter(|t| !t.is_empty()) {
            for entry in table.entries() {
                let word = u16::from(entry.code) << (16 - entry.len);
                let buf = word.to_be_bytes();

                let mut bs = BitReader::new(&buf);
                assert_eq!(table.read_symbol(&mut bs), Some(entry.symbol));
                assert_eq!(bs.bits_left(), 16 - usize::from(entry.len));
            }
        }
    }
}
