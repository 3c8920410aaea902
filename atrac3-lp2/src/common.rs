// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Frame geometry constants and common types for the LP2 profile.

/// Size of one channel's sound unit in bytes.
pub const SOUND_UNIT_BYTES: usize = 192;

/// Size of one stereo block in bytes: two sound units, left then right.
pub const STEREO_BLOCK_BYTES: usize = 2 * SOUND_UNIT_BYTES;

/// Decoded time-domain samples per channel per sound unit.
pub const FRAME_SAMPLES: usize = 1024;

/// Frequencies in a channel's full spectrum.
pub const SPECTRUM_FREQS: usize = 1024;

/// Number of QMF subbands.
pub const NUM_QMF_BANDS: usize = 4;

/// Frequencies per QMF subband within the 1024-entry spectrum.
pub const BAND_FREQS: usize = 256;

/// Time-domain samples per subband produced by the IMDCT.
pub const BAND_SAMPLES: usize = 2 * BAND_FREQS;

/// Samples in the inter-frame overlap region of each subband, which is also the span of one
/// gain-compensation curve.
pub const OVERLAP_SAMPLES: usize = 256;

/// Tonal bins per QMF subband.
pub const TONAL_BINS_PER_BAND: usize = 4;

/// Frequencies spanned by one tonal bin.
pub const FREQS_PER_TONAL_BIN: usize = 64;

/// Upper bound on the tonal components of a single group.
pub const MAX_TONAL_COMPONENTS: usize = 64;

/// Upper bound on gain-compensation points per subband.
pub const MAX_GAIN_POINTS: usize = 7;

/// The 6-bit sound unit header for the LP2 profile.
pub const MAGIC_HEADER_LP2: u32 = 0x28;

/// The gain level code of the normalized (unity) gain.
pub const NORMALIZED_GAIN_LEVEL: usize = 4;

/// How coefficient mantissas are entropy coded within a sound unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodingMode {
    /// Huffman-coded mantissas.
    VariableLength,
    /// Fixed-width two's complement mantissas.
    ConstantLength,
}

/// Guards a bitstream invariant, logging and returning the given parse error on failure.
macro_rules! validate {
    ($a:expr, $err:expr) => {
        if !$a {
            log::debug!("check failed at {}:{}", file!(), line!());
            return Err($err);
        }
    };
}

pub(crate) use validate;
