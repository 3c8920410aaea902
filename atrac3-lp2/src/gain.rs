// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gain-compensation curve synthesis.
//!
//! A frame's gain points define the amplitude envelope of the 256-sample overlap between that
//! frame's lead-out and the next frame's lead-in. The curve holds each level until the next
//! control point, reaching it through a geometric 8-sample ramp. The next frame's lead-in is
//! additionally scaled by a constant taken from its own first gain point.
//!
//! This gain data has the same shape as the gain control of the MPEG AAC SSR profile.

use crate::common::*;
use crate::tables::GAIN_LEVELS;
use crate::unit::GainPoint;

/// Fill `curve` from the previous frame's gain points for one subband.
///
/// `curr_initial_level` is the level code of the current frame's first gain point in the same
/// subband, or the normalized level when the current frame has none; the curve closes toward it
/// after the last control point. Returns the constant `lead_in_scale` to apply to the current
/// frame's samples during mixing, or `None` when the point list exceeds the format bound of 7
/// (the curve is then left untouched).
pub fn render_gain_curve(
    prev_points: &[GainPoint],
    curr_initial_level: usize,
    curve: &mut [f32; OVERLAP_SAMPLES],
) -> Option<f32> {
    let lead_in_scale = GAIN_LEVELS[curr_initial_level];

    if prev_points.len() > MAX_GAIN_POINTS {
        return None;
    }

    // No gain control in the previous frame: the envelope is identity.
    if prev_points.is_empty() {
        curve.fill(1.0);
        return Some(lead_in_scale);
    }

    // Hold to each control point, ramping over the 8 samples before a level change, then close
    // the curve toward the current frame's starting level.
    let mut offset = 0;
    let mut level = usize::from(prev_points[0].level_code);

    for point in prev_points {
        let to_offset = usize::from(point.location_code) * 8;
        ramp_then_hold(curve, offset, to_offset, level, usize::from(point.level_code));
        offset = to_offset;
        level = usize::from(point.level_code);
    }

    ramp_then_hold(curve, offset, OVERLAP_SAMPLES, level, curr_initial_level);

    Some(lead_in_scale)
}

/// The first gain level code of the given subband, or the normalized level when the sound unit
/// carries no points there.
pub fn initial_gain_level(bands: &[Vec<GainPoint>], band: usize) -> usize {
    match bands.get(band).and_then(|points| points.first()) {
        Some(point) => usize::from(point.level_code),
        None => NORMALIZED_GAIN_LEVEL,
    }
}

/// Ramp geometrically from `from_level` to `to_level` over 8 samples starting at `from`, then
/// hold `to_level` through `to - 1`. Without a level change the whole span is a hold.
fn ramp_then_hold(curve: &mut [f32], from: usize, to: usize, from_level: usize, to_level: usize) {
    let mut offset = from;

    if from_level != to_level && from < to {
        let step = 2f32.powf((from_level as f32 - to_level as f32) / 8.0);
        let mut gain = GAIN_LEVELS[from_level];
        for _ in 0..8 {
            curve[offset] = gain;
            gain *= step;
            offset += 1;
        }
    }

    let hold = GAIN_LEVELS[to_level];
    while offset < to {
        curve[offset] = hold;
        offset += 1;
    }
}
