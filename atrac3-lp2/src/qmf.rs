// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four-band QMF synthesis filterbank.
//!
//! Synthesis is a two-stage tree: stage one merges subbands 0/1 and 3/2 (bands 2 and 3 swap
//! positions, which the filterbank geometry requires), and stage two merges the two halves into
//! the output signal. Each merge demodulates a sample pair into sum and difference terms,
//! pushes them through a 48-deep history ring, and evaluates the odd and even sparse dot
//! products against the mirrored filter.
//!
//! The filter startup leaves a 46-sample transient at the head of the very first frame's
//! output; it is emitted unmodified.

use crate::common::OVERLAP_SAMPLES;
use crate::tables::{NUM_QMF_COEFFS, QMF_DECODING_SCALE, QMF_HALF_COEFFS};

/// A fixed-size ring holding the most recent demodulated samples of one synthesis stage.
/// Samples are indexed backward: offset 1 is the newest.
#[derive(Clone)]
pub struct HistoryBuffer {
    buf: [f32; NUM_QMF_COEFFS],
    pos: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        HistoryBuffer { buf: [0.0; NUM_QMF_COEFFS], pos: 0 }
    }

    /// Zero the ring.
    pub fn clear(&mut self) {
        self.buf = [0.0; NUM_QMF_COEFFS];
        self.pos = 0;
    }

    #[inline(always)]
    fn push(&mut self, value: f32) {
        self.buf[self.pos] = value;
        self.pos = (self.pos + 1) % NUM_QMF_COEFFS;
    }

    /// The sample pushed `back` pushes ago, with `back == 1` being the newest.
    #[inline(always)]
    fn at_back(&self, back: usize) -> f32 {
        debug_assert!(back >= 1 && back <= NUM_QMF_COEFFS);
        self.buf[(self.pos + NUM_QMF_COEFFS - back) % NUM_QMF_COEFFS]
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mirror the 24 half-coefficients into the even-symmetric 48-tap synthesis filter, scaled.
pub fn mirror_coefficients(half: &[f32; NUM_QMF_COEFFS / 2], scale: f32) -> [f32; NUM_QMF_COEFFS] {
    let mut coeffs = [0.0; NUM_QMF_COEFFS];
    for (i, &h) in half.iter().enumerate() {
        coeffs[i] = h * scale;
        coeffs[NUM_QMF_COEFFS - 1 - i] = h * scale;
    }
    coeffs
}

/// Merge one lowpass/highpass sample pair, producing two output samples.
fn qmf_step(
    coeffs: &[f32; NUM_QMF_COEFFS],
    lowpass: f32,
    highpass: f32,
    history: &mut HistoryBuffer,
) -> (f32, f32) {
    // Demodulation.
    history.push(lowpass + highpass);
    history.push(lowpass - highpass);

    // Odd and even sparse dot products between the filter and the history, newest last.
    let mut out1 = 0.0;
    let mut out2 = 0.0;
    for i in (0..NUM_QMF_COEFFS).step_by(2) {
        out1 += coeffs[i + 1] * history.at_back(NUM_QMF_COEFFS - 1 - i);
        out2 += coeffs[i] * history.at_back(NUM_QMF_COEFFS - i);
    }

    (out1, out2)
}

/// The two-stage synthesis tree recombining four 256-sample subbands into 1024 output samples.
pub struct QuadBandUpsampler {
    coeffs: [f32; NUM_QMF_COEFFS],
    history01: HistoryBuffer,
    history32: HistoryBuffer,
    history0123: HistoryBuffer,
}

impl QuadBandUpsampler {
    pub fn new() -> Self {
        QuadBandUpsampler {
            coeffs: mirror_coefficients(&QMF_HALF_COEFFS, QMF_DECODING_SCALE),
            history01: HistoryBuffer::new(),
            history32: HistoryBuffer::new(),
            history0123: HistoryBuffer::new(),
        }
    }

    /// Drop all inter-frame filter state.
    pub fn reset(&mut self) {
        self.history01.clear();
        self.history32.clear();
        self.history0123.clear();
    }

    /// Merge one timestep of the four subbands into four output samples.
    fn step(&mut self, b0: f32, b1: f32, b2: f32, b3: f32) -> [f32; 4] {
        let (a, b) = qmf_step(&self.coeffs, b0, b1, &mut self.history01);
        // Bands 2 and 3 swap positions going into the second stage-one filter.
        let (c, d) = qmf_step(&self.coeffs, b3, b2, &mut self.history32);

        let (out0, out1) = qmf_step(&self.coeffs, a, c, &mut self.history0123);
        let (out2, out3) = qmf_step(&self.coeffs, b, d, &mut self.history0123);

        [out0, out1, out2, out3]
    }

    /// Recombine the four subband buffers, appending `4 * OVERLAP_SAMPLES` samples to `out`.
    pub fn combine(
        &mut self,
        b0: &[f32; OVERLAP_SAMPLES],
        b1: &[f32; OVERLAP_SAMPLES],
        b2: &[f32; OVERLAP_SAMPLES],
        b3: &[f32; OVERLAP_SAMPLES],
        out: &mut Vec<f32>,
    ) {
        out.reserve(4 * OVERLAP_SAMPLES);
        for t in 0..OVERLAP_SAMPLES {
            out.extend_from_slice(&self.step(b0[t], b1[t], b2[t], b3[t]));
        }
    }
}

impl Default for QuadBandUpsampler {
    fn default() -> Self {
        Self::new()
    }
}
