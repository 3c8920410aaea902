// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `mdct` module implements the inverse Modified Discrete Cosine Transform (IMDCT).
//!
//! The transform is implemented in terms of a half-length forward FFT with pre- and
//! post-rotation. For an N-point spectrum the result is 2N time-domain samples:
//!
//! `out[n] = scale * sum(freq[k] * cos(PI/N * (n + (N+1)/2) * (k + 1/2)))`
//!
//! Note that the scale convention carries no 2/N normalization term. The ATRAC3 decoder invokes
//! the transform with `scale = -1.0`; the downstream overlap-add assumes that sign.

use std::sync::Arc;

use rustfft::num_complex::Complex;

/// The Inverse Modified Discrete Cosine Transform (IMDCT).
///
/// All scratch memory is owned by the `Imdct` value, so independent instances may run on
/// separate threads concurrently.
pub struct Imdct {
    fft: Arc<dyn rustfft::Fft<f32>>,
    fft_scratch: Box<[Complex<f32>]>,
    scratch: Box<[Complex<f32>]>,
    twiddle: Box<[Complex<f32>]>,
}

impl Imdct {
    /// Instantiate an N-point IMDCT producing outputs multiplied by `scale`.
    ///
    /// The value of `n` is the number of spectral samples and must be a power of two.
    pub fn new(n: usize, scale: f64) -> Self {
        assert!(n.is_power_of_two(), "n must be a power of two");

        let n2 = n / 2;

        // Pre-compute the twiddle factors. A negative scale is folded into the twiddles by
        // advancing both rotations a quarter turn, which negates every output sample.
        let mut twiddle = Vec::with_capacity(n2);

        let alpha = 1.0 / 8.0 + if scale.is_sign_positive() { 0.0 } else { n2 as f64 };
        let pi_n = std::f64::consts::PI / n as f64;
        let sqrt_scale = scale.abs().sqrt();

        for k in 0..n2 {
            let theta = pi_n * (alpha + k as f64);
            let re = sqrt_scale * theta.cos();
            let im = sqrt_scale * theta.sin();
            twiddle.push(Complex::new(re as f32, im as f32));
        }

        // A half-length forward FFT backs the transform.
        let mut planner = rustfft::FftPlanner::<f32>::new();

        let fft = planner.plan_fft_forward(n2);

        let fft_scratch =
            vec![Default::default(); fft.get_inplace_scratch_len()].into_boxed_slice();

        let scratch = vec![Default::default(); n2].into_boxed_slice();

        Imdct { fft, fft_scratch, scratch, twiddle: twiddle.into_boxed_slice() }
    }

    /// Performs the N-point inverse MDCT.
    ///
    /// The number of spectral samples in `freq` must equal the N the transform was instantiated
    /// with, and `out` must be of length 2N.
    pub fn imdct(&mut self, freq: &[f32], out: &mut [f32]) {
        // Spectral length: 2x FFT size, 0.5x output length.
        let n = self.fft.len() << 1;
        let n2 = n >> 1;
        let n4 = n >> 2;

        assert_eq!(freq.len(), n);
        assert_eq!(out.len(), 2 * n);

        // Pre-rotate and pack interleaved spectral pairs into complex values.
        for (i, (&w, t)) in self.twiddle.iter().zip(self.scratch.iter_mut()).enumerate() {
            let even = freq[i * 2];
            let odd = -freq[n - 1 - i * 2];

            let re = odd * w.im - even * w.re;
            let im = odd * w.re + even * w.im;
            *t = Complex::new(re, im);
        }

        self.fft.process_with_scratch(&mut self.scratch, &mut self.fft_scratch);

        // Split the 2N output samples into 4 vectors of N/2 samples each.
        let (vec0, vec1) = out.split_at_mut(n2);
        let (vec1, vec2) = vec1.split_at_mut(n2);
        let (vec2, vec3) = vec2.split_at_mut(n2);

        // Post-rotate and expand the N/2 complex FFT values into 2N real output samples. Each
        // complex value produces two forward-ordered and two reverse-ordered samples.
        for (i, (x, &w)) in self.scratch[..n4].iter().zip(self.twiddle[..n4].iter()).enumerate() {
            let val = w * x.conj();

            let fi = 2 * i;
            let ri = n2 - 1 - 2 * i;

            vec0[ri] = -val.im;
            vec1[fi] = val.im;
            vec2[ri] = val.re;
            vec3[fi] = val.re;
        }

        for (i, (x, &w)) in self.scratch[n4..].iter().zip(self.twiddle[n4..].iter()).enumerate() {
            let val = w * x.conj();

            let fi = 2 * i;
            let ri = n2 - 1 - 2 * i;

            vec0[fi] = -val.re;
            vec1[ri] = val.re;
            vec2[fi] = val.im;
            vec3[ri] = val.im;
        }
    }
}

/// Brute-force O(N^2) reference IMDCT, kept for validating the fast transform.
pub fn imdct_brute(freq: &[f32], out: &mut [f32], scale: f32) {
    assert_eq!(out.len(), 2 * freq.len());

    let n = freq.len();
    let pi_n = std::f64::consts::PI / n as f64;
    let half_shift = (n as f64 + 1.0) / 2.0;

    for (i, item) in out.iter_mut().enumerate() {
        let accum: f64 = freq
            .iter()
            .copied()
            .map(f64::from)
            .enumerate()
            .map(|(k, f)| f * (pi_n * (i as f64 + half_shift) * (k as f64 + 0.5)).cos())
            .sum();

        *item = (f64::from(scale) * accum) as f32;
    }
}
