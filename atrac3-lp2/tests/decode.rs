// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end decoding scenarios over synthetic bitstreams.

use atrac3_core::io::BitReader;
use atrac3_lp2::{
    Atrac3Decoder, ParseError, SoundUnit, FRAME_SAMPLES, SOUND_UNIT_BYTES, STEREO_BLOCK_BYTES,
};

/// Minimal MSB-first bit packer for building test streams.
struct BitWriter {
    bytes: Vec<u8>,
    bit_pos: usize,
}

impl BitWriter {
    fn new() -> Self {
        BitWriter { bytes: Vec::new(), bit_pos: 0 }
    }

    fn put(&mut self, value: u32, num_bits: u32) {
        for shift in (0..num_bits).rev() {
            let bit = (value >> shift) & 1;
            if self.bit_pos % 8 == 0 {
                self.bytes.push(0);
            }
            let byte = self.bytes.last_mut().unwrap();
            *byte |= (bit as u8) << (7 - (self.bit_pos % 8));
            self.bit_pos += 1;
        }
    }

    fn into_unit(mut self) -> Vec<u8> {
        assert!(self.bytes.len() <= SOUND_UNIT_BYTES);
        self.bytes.resize(SOUND_UNIT_BYTES, 0);
        self.bytes
    }
}

/// A well-formed sound unit carrying no audio: one encoded QMF band, no gain points, no tonal
/// groups, and all 32 spectral subbands skipped.
fn silent_unit_bytes() -> Vec<u8> {
    let mut bw = BitWriter::new();
    bw.put(0x28, 6); // magic
    bw.put(0, 2); // 1 encoded QMF band
    bw.put(0, 3); // no gain points in band 0
    bw.put(0, 5); // no tonal groups
    bw.put(31, 5); // 32 spectral subbands
    bw.put(0, 1); // VLC spectrum coding
    for _ in 0..32 {
        bw.put(0, 3); // every band skipped
    }
    bw.into_unit()
}

#[test]
fn bad_magic_is_rejected() {
    let mut bw = BitWriter::new();
    bw.put(0x29, 6);
    let bytes = bw.into_unit();

    let mut bs = BitReader::new(&bytes);
    assert_eq!(SoundUnit::read(&mut bs).unwrap_err(), ParseError::BadMagic);
}

#[test]
fn minimal_unit_parses() {
    let bytes = silent_unit_bytes();

    let mut bs = BitReader::new(&bytes);
    let unit = SoundUnit::read(&mut bs).unwrap();

    assert_eq!(unit.gain_bands.len(), 1);
    assert!(unit.gain_bands[0].is_empty());
    assert!(unit.tonal_groups.is_empty());

    // The spectral bands must still tile the full 1024-entry spectrum.
    assert_eq!(unit.spectral_bands.len(), 32);
    let mut next = 0;
    for band in &unit.spectral_bands {
        assert_eq!(band.start_frequency, next);
        assert_eq!(band.table_selector, 0);
        assert!(band.mantissas.iter().all(|&m| m == 0));
        next = band.start_frequency + band.num_values;
    }
    assert_eq!(next, 1024);
}

#[test]
fn consecutive_silent_frames_decode_to_zeros() {
    let unit = silent_unit_bytes();
    let mut block = unit.clone();
    block.extend_from_slice(&unit);
    assert_eq!(block.len(), STEREO_BLOCK_BYTES);

    let mut decoder = Atrac3Decoder::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    decoder.decode_block(&block, &mut left, &mut right).unwrap();
    decoder.decode_block(&block, &mut left, &mut right).unwrap();

    assert_eq!(left.len(), 2 * FRAME_SAMPLES);
    assert_eq!(right.len(), 2 * FRAME_SAMPLES);

    // The second frame (and the first, being silence) must be exactly zero.
    assert!(left[FRAME_SAMPLES..].iter().all(|&s| s == 0.0));
    assert!(right[FRAME_SAMPLES..].iter().all(|&s| s == 0.0));
}

#[test]
fn truncated_block_is_rejected() {
    let mut decoder = Atrac3Decoder::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    let err = decoder.decode_block(&[0u8; 100], &mut left, &mut right).unwrap_err();
    assert_eq!(err, ParseError::BitstreamExhausted);
    assert!(left.is_empty() && right.is_empty());
}

#[test]
fn bad_frame_leaves_state_decodable() {
    let unit = silent_unit_bytes();
    let mut good = unit.clone();
    good.extend_from_slice(&unit);

    let bad = vec![0xa4u8; STEREO_BLOCK_BYTES]; // leading bits 101001 != 0x28

    let mut decoder = Atrac3Decoder::new();
    let mut left = Vec::new();
    let mut right = Vec::new();

    decoder.decode_block(&good, &mut left, &mut right).unwrap();
    assert!(decoder.decode_block(&bad, &mut left, &mut right).is_err());
    decoder.decode_block(&good, &mut left, &mut right).unwrap();

    assert_eq!(left.len(), 2 * FRAME_SAMPLES);
    assert!(left.iter().all(|&s| s == 0.0));
}
