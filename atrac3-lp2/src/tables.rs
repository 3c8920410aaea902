// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constant tables of the ATRAC3 format: quantization steps, scale factors, gain levels,
//! transform windows, spectral-subband offsets, and the QMF filter prototype.

use lazy_static::lazy_static;

use crate::common::*;

/// Reciprocals of the quantizer step per table selector. Selector 0 marks a skipped band.
#[rustfmt::skip]
pub const INVERSE_QUANT: [f32; 8] = [
    0.0, 1.0 / 1.5, 1.0 / 2.5, 1.0 / 3.5, 1.0 / 4.5, 1.0 / 7.5, 1.0 / 15.5, 1.0 / 31.5,
];

/// Mantissa bit widths for constant-length coding, per table selector. Selector 1 is special:
/// two ternary values are packed into one 4-bit field (see [`CLC_PAIR_VALUES`]).
pub const CLC_BITS: [u32; 8] = [0, 4, 3, 3, 4, 4, 5, 6];

/// Ternary mantissa values selected by each 2-bit half of a table-1 constant-length field.
pub const CLC_PAIR_VALUES: [i32; 4] = [0, 1, -2, -1];

/// Mantissa value pairs selected by a table-1 Huffman symbol. Every combination of -1, 0 and 1
/// is covered, so one codeword yields two spectral values.
#[rustfmt::skip]
pub const VLC_PAIR_VALUES: [i32; 18] = [
    0, 0,   0, 1,   0, -1,   1, 0,   -1, 0,
    1, 1,   1, -1,  -1, 1,   -1, -1,
];

/// Cumulative start offsets of the 32 spectral subbands within the 1024-entry spectrum. The
/// final entry closes the table.
#[rustfmt::skip]
pub const SUBBAND_OFFSETS: [usize; 33] = [
      0,   8,  16,  24,  32,  40,  48,  56,  64,  80,  96, 112, 128, 144, 160, 176,
    192, 224, 256, 288, 320, 352, 384, 416, 448, 480, 512, 576, 640, 704, 768, 896,
   1024,
];

/// Looks up a spectral subband's `(start_frequency, num_values)` extent, or `None` when the
/// index falls outside the offset table.
pub fn spectral_band_extent(index: usize) -> Option<(usize, usize)> {
    if index + 1 < SUBBAND_OFFSETS.len() {
        let start = SUBBAND_OFFSETS[index];
        Some((start, SUBBAND_OFFSETS[index + 1] - start))
    }
    else {
        None
    }
}

/// The 24 published half-coefficients of the 48-tap QMF synthesis prototype. The full filter is
/// the even-symmetric mirror of these scaled by [`QMF_DECODING_SCALE`].
#[rustfmt::skip]
pub const QMF_HALF_COEFFS: [f32; 24] = [
    -0.000_014_619_070, -0.000_092_054_790, -0.000_056_157_569,  0.000_301_172_695,
     0.000_242_251_903, -0.000_852_938_975, -0.000_520_557_398,  0.002_034_016_885,
     0.000_783_338_910, -0.004_215_386_231, -0.000_756_149_879,  0.007_840_294_391,
    -0.000_061_169_922, -0.013_441_620_395,  0.002_462_682_082,  0.021_736_089_140,
    -0.007_801_671_047, -0.034_090_220_928,  0.018_809_489_906,  0.054_326_009_006,
    -0.043_596_379_459, -0.099_384_367_466,  0.132_079_094_649,  0.464_241_594_076,
];

/// Scale applied to the half-coefficients when mirroring the synthesis filter for decoding.
pub const QMF_DECODING_SCALE: f32 = 2.0;

/// Tap count of the mirrored QMF synthesis filter.
pub const NUM_QMF_COEFFS: usize = 2 * QMF_HALF_COEFFS.len();

lazy_static! {
    /// Exponential magnitude multipliers indexed by the 6-bit scale factor codes:
    /// `2^(-5 + k/3)`.
    pub static ref SCALE_FACTORS: [f32; 64] = {
        let mut table = [0f32; 64];
        for (k, f) in table.iter_mut().enumerate() {
            *f = 2f32.powf(-5.0 + k as f32 / 3.0);
        }
        table
    };

    /// Gain-compensation levels indexed by the 4-bit level codes: `2^(4 - k)`, spanning
    /// [2^-11, 16]. Code 4 is the normalized (unity) level.
    pub static ref GAIN_LEVELS: [f32; 16] = {
        let mut table = [0f32; 16];
        for (k, g) in table.iter_mut().enumerate() {
            *g = 2f32.powf(4.0 - k as f32);
        }
        table
    };

    /// The encoder's MDCT window: a raised-cosine curve offset by half a sample.
    pub static ref ENCODING_WINDOW: [f32; BAND_SAMPLES] = {
        let mut window = [0f32; BAND_SAMPLES];
        for (i, w) in window.iter_mut().enumerate() {
            let t = (i as f32 + 0.5) / BAND_SAMPLES as f32;
            *w = (1.0 - (t * 2.0 * std::f32::consts::PI).cos()) * 0.5;
        }
        window
    };

    /// The decoder window complementing [`ENCODING_WINDOW`]. The encoding window alone does not
    /// satisfy perfect reconstruction; the mutual constraint with 50% overlap is
    /// `e[i]*d[i] + e[i+256]*d[i+256] = 1`, which this derivation satisfies.
    pub static ref DECODING_WINDOW: [f32; BAND_SAMPLES] = {
        let mut window = [0f32; BAND_SAMPLES];
        for (i, w) in window.iter_mut().enumerate() {
            let a = ENCODING_WINDOW[i];
            let b = ENCODING_WINDOW[(i + OVERLAP_SAMPLES) % BAND_SAMPLES];
            *w = a / (a * a + b * b);
        }
        window
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_windows_satisfy_tdac() {
        // e[i]*d[i] + e[i+256]*d[i+256] == 1 over the overlap.
        for i in 0..OVERLAP_SAMPLES {
            let sum = ENCODING_WINDOW[i] * DECODING_WINDOW[i]
                + ENCODING_WINDOW[i + 256] * DECODING_WINDOW[i + 256];
            assert!((sum - 1.0).abs() < 1e-6, "sample {}: {}", i, sum);
        }
    }

    #[test]
    fn verify_scale_factors() {
        assert!((SCALE_FACTORS[0] - 2f32.powf(-5.0)).abs() < 1e-9);
        assert!((SCALE_FACTORS[15] - 1.0).abs() < 1e-6);
        assert!((SCALE_FACTORS[63] - 2f32.powf(-5.0 + 21.0)).abs() < 1.0);
    }

    #[test]
    fn verify_gain_levels() {
        assert_eq!(GAIN_LEVELS[0], 16.0);
        assert_eq!(GAIN_LEVELS[NORMALIZED_GAIN_LEVEL], 1.0);
        assert_eq!(GAIN_LEVELS[15], 2f32.powf(-11.0));
    }

    #[test]
    fn verify_subband_offsets() {
        // Monotonic, covering the full spectrum.
        for pair in SUBBAND_OFFSETS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(SUBBAND_OFFSETS[0], 0);
        assert_eq!(*SUBBAND_OFFSETS.last().unwrap(), 1024);

        assert_eq!(spectral_band_extent(0), Some((0, 8)));
        assert_eq!(spectral_band_extent(31), Some((896, 128)));
        assert_eq!(spectral_band_extent(32), None);
    }
}
