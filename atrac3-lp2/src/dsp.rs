// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-channel rendering of parsed sound units into PCM.
//!
//! For every sound unit the renderer accumulates the spectrum, runs an inverse MDCT per QMF
//! subband, applies the decoding window, synthesizes the gain-compensation curve, overlap-adds
//! against the previous frame's tail, and recombines the four subbands through the QMF
//! filterbank. The channel state carries the previous frame's windowed subbands, its gain
//! points, and the filterbank history across calls.

use atrac3_core::dsp::Imdct;

use crate::common::*;
use crate::gain;
use crate::qmf::QuadBandUpsampler;
use crate::tables::DECODING_WINDOW;
use crate::unit::{GainPoint, SoundUnit, SpectralSubband, TonalComponent};

/// The IMDCT sign convention of the decoder. The downstream overlap-add assumes negated
/// transform output; changing one without the other inverts the audio.
const IMDCT_SCALE: f64 = -1.0;

/// Inter-frame state of one subband.
struct Subband {
    /// This frame's windowed IMDCT output.
    windowed: [f32; BAND_SAMPLES],
    /// The previous frame's windowed IMDCT output.
    prev_windowed: [f32; BAND_SAMPLES],
    /// The previous frame's gain points for this subband.
    prev_gain: Vec<GainPoint>,
    /// The rendered gain curve of the current overlap.
    gain: [f32; OVERLAP_SAMPLES],
    /// The gain-compensated mix of the overlapping halves.
    mix: [f32; OVERLAP_SAMPLES],
}

impl Subband {
    fn new() -> Self {
        Subband {
            windowed: [0.0; BAND_SAMPLES],
            prev_windowed: [0.0; BAND_SAMPLES],
            prev_gain: Vec::new(),
            gain: [0.0; OVERLAP_SAMPLES],
            mix: [0.0; OVERLAP_SAMPLES],
        }
    }

    fn reset(&mut self) {
        self.windowed = [0.0; BAND_SAMPLES];
        self.prev_windowed = [0.0; BAND_SAMPLES];
        self.prev_gain.clear();
    }
}

/// Persistent per-channel decoding state.
///
/// One `ChannelState` must see every sound unit of its channel in stream order. Two channels
/// are two independent values and may be rendered on separate threads.
pub struct ChannelState {
    spectrum: [f32; SPECTRUM_FREQS],
    imdct: Imdct,
    subbands: [Subband; NUM_QMF_BANDS],
    qmf: QuadBandUpsampler,
}

impl ChannelState {
    pub fn new() -> Self {
        ChannelState {
            spectrum: [0.0; SPECTRUM_FREQS],
            imdct: Imdct::new(BAND_FREQS, IMDCT_SCALE),
            subbands: [Subband::new(), Subband::new(), Subband::new(), Subband::new()],
            qmf: QuadBandUpsampler::new(),
        }
    }

    /// Drop all inter-frame state, as after a seek.
    pub fn reset(&mut self) {
        for subband in self.subbands.iter_mut() {
            subband.reset();
        }
        self.qmf.reset();
    }

    /// Render one sound unit, appending 1024 samples to `out`.
    ///
    /// Output amplitude is at signed-16-bit numeric scale; peaks reach roughly +/-32768.
    pub fn render(&mut self, unit: &SoundUnit, out: &mut Vec<f32>) {
        let ChannelState { spectrum, imdct, subbands, qmf } = self;

        // Accumulate tonal and spectral contributions; overlaps add.
        spectrum.fill(0.0);
        for group in unit.tonal_groups.iter() {
            accumulate_tonal(spectrum, &group.components);
        }
        accumulate_spectral(spectrum, &unit.spectral_bands);

        // Subbands 1 and 3 store their frequencies in flipped order, reflecting the spectral
        // mirroring of QMF-shifted bands.
        spectrum[BAND_FREQS..2 * BAND_FREQS].reverse();
        spectrum[3 * BAND_FREQS..].reverse();

        for (band, subband) in subbands.iter_mut().enumerate() {
            // Reconstruct this frame's half-overlapped samples.
            let freqs = &spectrum[band * BAND_FREQS..(band + 1) * BAND_FREQS];
            imdct.imdct(freqs, &mut subband.windowed);
            for (sample, &w) in subband.windowed.iter_mut().zip(DECODING_WINDOW.iter()) {
                *sample *= w;
            }

            // The previous frame's gain points shape the whole overlap; the current frame's
            // lead-in is additionally held at its own starting level.
            let initial = gain::initial_gain_level(&unit.gain_bands, band);
            let lead_in =
                match gain::render_gain_curve(&subband.prev_gain, initial, &mut subband.gain) {
                    Some(scale) => scale,
                    None => 1.0,
                };

            for i in 0..OVERLAP_SAMPLES {
                subband.mix[i] = subband.gain[i]
                    * (subband.windowed[i] * lead_in + subband.prev_windowed[i + OVERLAP_SAMPLES]);
            }

            // Carry this frame into the next.
            subband.prev_windowed.copy_from_slice(&subband.windowed);
            subband.prev_gain.clear();
            if let Some(points) = unit.gain_bands.get(band) {
                subband.prev_gain.extend_from_slice(points);
            }
        }

        let [sb0, sb1, sb2, sb3] = subbands;
        qmf.combine(&sb0.mix, &sb1.mix, &sb2.mix, &sb3.mix, out);
    }
}

impl Default for ChannelState {
    fn default() -> Self {
        Self::new()
    }
}

fn accumulate_tonal(spectrum: &mut [f32; SPECTRUM_FREQS], components: &[TonalComponent]) {
    for component in components {
        let start = component.start_frequency;
        for (i, &m) in component.mantissas.iter().enumerate() {
            spectrum[start + i] += m as f32 * component.scale_factor;
        }
    }
}

fn accumulate_spectral(spectrum: &mut [f32; SPECTRUM_FREQS], bands: &[SpectralSubband]) {
    for band in bands {
        let start = band.start_frequency;
        for (i, &m) in band.mantissas.iter().enumerate() {
            spectrum[start + i] += m as f32 * band.scale_factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{INVERSE_QUANT, SCALE_FACTORS};
    use crate::unit::TonalGroup;

    fn silent_unit() -> SoundUnit {
        SoundUnit { gain_bands: vec![Vec::new(); 4], ..Default::default() }
    }

    #[test]
    fn verify_silence_renders_zeros() {
        let mut state = ChannelState::new();
        let mut pcm = Vec::new();

        state.render(&silent_unit(), &mut pcm);
        state.render(&silent_unit(), &mut pcm);

        assert_eq!(pcm.len(), 2 * FRAME_SAMPLES);
        assert!(pcm[FRAME_SAMPLES..].iter().all(|&s| s == 0.0));
        // The first frame is also silent; the filter transient has nothing to ring on.
        assert!(pcm[..FRAME_SAMPLES].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn verify_overlap_carries_tonal_tail() {
        // Frame 1 carries a single unit tonal component; frame 2 is silence. Frame 2's overlap
        // mix must be exactly the windowed tail of frame 1.
        let scale_factor = SCALE_FACTORS[20] * INVERSE_QUANT[2];
        let tonal = TonalComponent {
            start_frequency: 0,
            scale_factor_index: 20,
            table_selector: 2,
            mantissas: vec![1],
            scale_factor,
        };
        let unit1 = SoundUnit {
            gain_bands: vec![Vec::new(); 4],
            tonal_groups: vec![TonalGroup {
                num_values_per_component: 1,
                quant_step_index: 2,
                coding_mode: CodingMode::VariableLength,
                components: vec![tonal],
            }],
            spectral_bands: Vec::new(),
        };

        // The expected tail: IMDCT of the impulse spectrum, windowed.
        let mut freqs = [0f32; BAND_FREQS];
        freqs[0] = scale_factor;
        let mut windowed = [0f32; BAND_SAMPLES];
        Imdct::new(BAND_FREQS, -1.0).imdct(&freqs, &mut windowed);
        for (sample, &w) in windowed.iter_mut().zip(DECODING_WINDOW.iter()) {
            *sample *= w;
        }

        let mut state = ChannelState::new();
        let mut pcm = Vec::new();
        state.render(&unit1, &mut pcm);
        state.render(&silent_unit(), &mut pcm);

        for i in 0..OVERLAP_SAMPLES {
            let expected = windowed[i + OVERLAP_SAMPLES];
            let got = state.subbands[0].mix[i];
            assert!((got - expected).abs() < 1e-6, "sample {}: {} vs {}", i, got, expected);
        }

        // The other subbands stay silent.
        for band in 1..NUM_QMF_BANDS {
            assert!(state.subbands[band].mix.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn verify_lead_in_scaling() {
        // A current frame whose first gain point sits at level 3 scales its own lead-in by
        // 2^(4-3) = 2 while the previous frame's tail is unscaled.
        let tonal = TonalComponent {
            start_frequency: 0,
            scale_factor_index: 20,
            table_selector: 2,
            mantissas: vec![1],
            scale_factor: SCALE_FACTORS[20] * INVERSE_QUANT[2],
        };
        let make_unit = |gain_bands: Vec<Vec<GainPoint>>| SoundUnit {
            gain_bands,
            tonal_groups: vec![TonalGroup {
                num_values_per_component: 1,
                quant_step_index: 2,
                coding_mode: CodingMode::VariableLength,
                components: vec![tonal.clone()],
            }],
            spectral_bands: Vec::new(),
        };

        let mut plain = ChannelState::new();
        let mut scaled = ChannelState::new();
        let mut sink = Vec::new();

        plain.render(&make_unit(vec![Vec::new(); 4]), &mut sink);
        scaled.render(
            &make_unit(vec![
                vec![GainPoint { level_code: 3, location_code: 4 }],
                Vec::new(),
                Vec::new(),
                Vec::new(),
            ]),
            &mut sink,
        );

        for i in 0..OVERLAP_SAMPLES {
            let expected = 2.0 * plain.subbands[0].mix[i];
            let got = scaled.subbands[0].mix[i];
            assert!((got - expected).abs() < 1e-4, "sample {}: {} vs {}", i, got, expected);
        }
    }
}
