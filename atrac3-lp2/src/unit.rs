// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The sound-unit bitstream parser.
//!
//! A sound unit is the 192-byte bitstream image of one channel of one frame. Its grammar, in
//! order: a 6-bit magic header, the encoded QMF band count, the gain-compensation control
//! points, the tonal component groups, and the residual spectral subbands.

use atrac3_core::io::BitReader;

use crate::codebooks::HUFFMAN_TABLES;
use crate::common::*;
use crate::errors::{ParseError, Result};
use crate::tables;

/// One gain-compensation control point. `location_code * 8` is the sample position at which the
/// gain has already reached `GAIN_LEVELS[level_code]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GainPoint {
    /// 4-bit index into the gain level table.
    pub level_code: u8,
    /// 5-bit sample location in multiples of 8.
    pub location_code: u8,
}

/// An isolated high-precision frequency, extracted from the residual spectrum so that spectral
/// coding can work closer to the noise floor.
#[derive(Clone, Debug)]
pub struct TonalComponent {
    /// Position within the 1024-entry spectrum where the mantissas begin.
    pub start_frequency: usize,
    /// 6-bit index into the scale factor table.
    pub scale_factor_index: usize,
    /// The quantization table in effect, 2..=7.
    pub table_selector: usize,
    /// Unscaled signed amplitudes, at most 8.
    pub mantissas: Vec<i32>,
    /// Combined scale: scale factor times inverse quantization step.
    pub scale_factor: f32,
}

/// Tonal components sharing one set of encoding parameters.
#[derive(Clone, Debug)]
pub struct TonalGroup {
    /// Mantissas carried per child component, 1..=8.
    pub num_values_per_component: usize,
    /// Quantization step index, 2..=7.
    pub quant_step_index: usize,
    /// Entropy coding of the child mantissas.
    pub coding_mode: CodingMode,
    /// The child components of the group.
    pub components: Vec<TonalComponent>,
}

/// One residual spectrum band. A band whose `table_selector` is 0 is skipped entirely and its
/// mantissas stay zero.
#[derive(Clone, Debug)]
pub struct SpectralSubband {
    /// 3-bit quantization table selector; 0 marks a skipped band.
    pub table_selector: usize,
    /// 6-bit index into the scale factor table; 0 when the band is skipped.
    pub scale_factor_index: usize,
    /// Position within the 1024-entry spectrum where this band begins.
    pub start_frequency: usize,
    /// Number of frequencies the band spans.
    pub num_values: usize,
    /// Unscaled signed amplitudes, one per frequency.
    pub mantissas: Vec<i32>,
    /// Combined scale: scale factor times inverse quantization step.
    pub scale_factor: f32,
}

/// The parsed image of one channel of one frame.
#[derive(Clone, Debug, Default)]
pub struct SoundUnit {
    /// Gain-compensation points per encoded QMF subband, 1 to 4 entries.
    pub gain_bands: Vec<Vec<GainPoint>>,
    /// The tonal component groups.
    pub tonal_groups: Vec<TonalGroup>,
    /// The residual spectrum bands.
    pub spectral_bands: Vec<SpectralSubband>,
}

impl SoundUnit {
    /// Parse one sound unit from the bitstream.
    pub fn read(bs: &mut BitReader<'_>) -> Result<SoundUnit> {
        validate!(bs.read_bits(6) == MAGIC_HEADER_LP2, ParseError::BadMagic);

        let num_bands = bs.read_bits(2) as usize + 1;
        log::trace!("sound unit: {} encoded qmf bands", num_bands);

        let gain_bands = read_gain_bands(bs, num_bands)?;
        let tonal_groups = read_tonal_groups(bs, num_bands)?;
        let spectral_bands = read_spectral_bands(bs)?;

        log::trace!(
            "sound unit: {} tonal groups, {} spectral subbands, ended at byte {}",
            tonal_groups.len(),
            spectral_bands.len(),
            bs.byte_offset(),
        );

        Ok(SoundUnit { gain_bands, tonal_groups, spectral_bands })
    }
}

fn read_gain_bands(bs: &mut BitReader<'_>, num_bands: usize) -> Result<Vec<Vec<GainPoint>>> {
    let mut bands = Vec::with_capacity(num_bands);

    for _ in 0..num_bands {
        let num_points = bs.read_bits(3) as usize;
        log::trace!("gain compensation: {} points", num_points);

        let mut points = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            let level = bs.try_read_bits(4).ok_or(ParseError::BitstreamExhausted)?;
            let location = bs.try_read_bits(5).ok_or(ParseError::BitstreamExhausted)?;
            points.push(GainPoint { level_code: level as u8, location_code: location as u8 });
        }

        bands.push(points);
    }

    Ok(bands)
}

fn read_tonal_groups(bs: &mut BitReader<'_>, num_bands: usize) -> Result<Vec<TonalGroup>> {
    let num_groups = bs.read_bits(5) as usize;
    log::trace!("tonal components: {} groups", num_groups);
    if num_groups == 0 {
        return Ok(Vec::new());
    }

    // 0 = variable length, 1 = constant length, 3 = chosen per group; 2 is reserved.
    let default_mode = bs.read_bits(2);
    validate!(default_mode != 2, ParseError::InvalidCodingMode);

    let mut groups = Vec::with_capacity(num_groups);
    for _ in 0..num_groups {
        groups.push(read_tonal_group(bs, num_bands, default_mode)?);
    }

    Ok(groups)
}

fn read_tonal_group(
    bs: &mut BitReader<'_>,
    num_bands: usize,
    default_mode: u32,
) -> Result<TonalGroup> {
    // Which of the encoded subbands carry tonal data in this group.
    let mut band_flags = [false; NUM_QMF_BANDS];
    bs.read_bit_array(&mut band_flags[..num_bands]);

    let num_values = bs.read_bits(3) as usize + 1;

    let quant_step = bs.read_bits(3) as usize;
    validate!(quant_step > 1, ParseError::InvalidQuantStep);

    let coding_mode = match default_mode {
        3 => match bs.read_bit() {
            0 => CodingMode::VariableLength,
            _ => CodingMode::ConstantLength,
        },
        1 => CodingMode::ConstantLength,
        _ => CodingMode::VariableLength,
    };

    let mut components = Vec::new();

    for (band, _) in band_flags.iter().enumerate().take(num_bands).filter(|(_, &f)| f) {
        for bin in 0..TONAL_BINS_PER_BAND {
            let count = bs.read_bits(3) as usize;
            let tonal_bin = band * TONAL_BINS_PER_BAND + bin;

            for _ in 0..count {
                components.push(read_tonal_component(
                    bs,
                    coding_mode,
                    quant_step,
                    num_values,
                    tonal_bin,
                )?);
            }
        }
    }

    validate!(components.len() <= MAX_TONAL_COMPONENTS, ParseError::TooManyTonalComponents);

    Ok(TonalGroup {
        num_values_per_component: num_values,
        quant_step_index: quant_step,
        coding_mode,
        components,
    })
}

fn read_tonal_component(
    bs: &mut BitReader<'_>,
    coding_mode: CodingMode,
    quant_step: usize,
    num_values: usize,
    tonal_bin: usize,
) -> Result<TonalComponent> {
    let scale_factor_index = bs.read_bits(6) as usize;
    let position_offset = bs.read_bits(6) as usize;

    // Clip mantissas that would run past the top of the spectrum.
    let start_frequency = tonal_bin * FREQS_PER_TONAL_BIN + position_offset;
    let end_frequency = (start_frequency + num_values).min(SPECTRUM_FREQS);

    let mut mantissas = vec![0i32; end_frequency - start_frequency];
    read_mantissas(bs, coding_mode, quant_step, &mut mantissas)?;

    let scale_factor =
        tables::SCALE_FACTORS[scale_factor_index] * tables::INVERSE_QUANT[quant_step];

    Ok(TonalComponent {
        start_frequency,
        scale_factor_index,
        table_selector: quant_step,
        mantissas,
        scale_factor,
    })
}

fn read_spectral_bands(bs: &mut BitReader<'_>) -> Result<Vec<SpectralSubband>> {
    let num_subbands = bs.read_bits(5) as usize + 1;

    let coding_mode = match bs.read_bit() {
        0 => CodingMode::VariableLength,
        _ => CodingMode::ConstantLength,
    };

    // First every band's table selector and fixed extent, mantissas zeroed.
    let mut bands = Vec::with_capacity(num_subbands);
    for index in 0..num_subbands {
        let table_selector = bs.read_bits(3) as usize;

        let (start_frequency, num_values) =
            tables::spectral_band_extent(index).ok_or(ParseError::SubbandIndexOutOfRange)?;

        bands.push(SpectralSubband {
            table_selector,
            scale_factor_index: 0,
            start_frequency,
            num_values,
            mantissas: vec![0; num_values],
            scale_factor: 0.0,
        });
    }

    // Then a scale factor for every band that is not skipped.
    for band in bands.iter_mut() {
        if band.table_selector != 0 {
            band.scale_factor_index = bs.read_bits(6) as usize;
        }
        band.scale_factor =
            tables::SCALE_FACTORS[band.scale_factor_index] * tables::INVERSE_QUANT[band.table_selector];
    }

    // Finally the mantissas of every band that is not skipped.
    for band in bands.iter_mut() {
        if band.table_selector != 0 {
            read_mantissas(bs, coding_mode, band.table_selector, &mut band.mantissas)?;
        }
    }

    Ok(bands)
}

fn read_mantissas(
    bs: &mut BitReader<'_>,
    coding_mode: CodingMode,
    table_index: usize,
    dst: &mut [i32],
) -> Result<()> {
    match coding_mode {
        CodingMode::ConstantLength => read_mantissas_clc(bs, table_index, dst),
        CodingMode::VariableLength => read_mantissas_vlc(bs, table_index, dst),
    }
}

fn read_mantissas_clc(bs: &mut BitReader<'_>, table_index: usize, dst: &mut [i32]) -> Result<()> {
    if table_index == 1 {
        // Two ternary values packed into one 4-bit field.
        for pair in dst.chunks_mut(2) {
            let bits = bs.read_bits(4) as usize;
            pair[0] = tables::CLC_PAIR_VALUES[bits >> 2];
            if let Some(second) = pair.get_mut(1) {
                *second = tables::CLC_PAIR_VALUES[bits & 0x3];
            }
        }
    }
    else {
        let width = tables::CLC_BITS[table_index];
        for value in dst.iter_mut() {
            *value = bs.read_bits_signed(width);
        }
    }

    Ok(())
}

fn read_mantissas_vlc(bs: &mut BitReader<'_>, table_index: usize, dst: &mut [i32]) -> Result<()> {
    if table_index == 1 {
        // One codeword covers a value pair; for an odd count the trailing half is dropped.
        let table = &HUFFMAN_TABLES[1];
        for pair in dst.chunks_mut(2) {
            let symbol = table.read_symbol(bs).ok_or(ParseError::HuffmanDecodeFailure)?;
            let symbol = symbol as usize;
            pair[0] = tables::VLC_PAIR_VALUES[symbol * 2];
            if let Some(second) = pair.get_mut(1) {
                *second = tables::VLC_PAIR_VALUES[symbol * 2 + 1];
            }
        }
    }
    else {
        let table = &HUFFMAN_TABLES[table_index];
        for value in dst.iter_mut() {
            let symbol = table.read_symbol(bs).ok_or(ParseError::HuffmanDecodeFailure)?;
            *value = i32::from(symbol);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrac3_core::io::BitReader;

    #[test]
    fn verify_clc_mantissas() {
        // Table 4 reads 4-bit two's complement values: 0b0011 = 3, 0b1101 = -3, 0b1000 = -8.
        let mut bs = BitReader::new(&[0b0011_1101, 0b1000_0000]);
        let mut dst = [0i32; 3];

        read_mantissas(&mut bs, CodingMode::ConstantLength, 4, &mut dst).unwrap();
        assert_eq!(dst, [3, -3, -8]);
    }

    #[test]
    fn verify_clc_pair_mantissas() {
        // Table 1 packs two 2-bit ternary codes per field: 0b0111 = (1, -1), 0b1000 = (-2, 0).
        let mut bs = BitReader::new(&[0b0111_1000]);
        let mut dst = [0i32; 4];

        read_mantissas(&mut bs, CodingMode::ConstantLength, 1, &mut dst).unwrap();
        assert_eq!(dst, [1, -1, -2, 0]);
    }

    #[test]
    fn verify_vlc_mantissas() {
        // Table 2 codewords: 0 -> 0, 100 -> 1, 101 -> -1, 110 -> 2, 111 -> -2.
        let mut bs = BitReader::new(&[0b0100_1011, 0b1011_1000]);
        let mut dst = [0i32; 5];

        read_mantissas(&mut bs, CodingMode::VariableLength, 2, &mut dst).unwrap();
        assert_eq!(dst, [0, 1, -1, 2, -2]);
    }

    #[test]
    fn verify_vlc_pair_mantissas_drop_odd_tail() {
        // Table 1 symbol 5 (codeword 11100) selects the pair (1, 1). With an odd-length
        // destination the trailing half of the last pair is dropped.
        let mut bs = BitReader::new(&[0b1110_0111, 0b0000_0000]);
        let mut dst = [0i32; 3];

        read_mantissas(&mut bs, CodingMode::VariableLength, 1, &mut dst).unwrap();
        assert_eq!(dst, [1, 1, 1]);
    }

    #[test]
    fn verify_tonal_component_clips_at_spectrum_end() {
        // A component in the last tonal bin at offset 62 with 8 values per component only has
        // room for 2 mantissas. Scale factor index 0, position 62, then two table-2 zeros.
        let mut bs = BitReader::new(&[0b0000_0011, 0b1110_0000]);

        let comp =
            read_tonal_component(&mut bs, CodingMode::VariableLength, 2, 8, 15).unwrap();

        assert_eq!(comp.start_frequency, 15 * 64 + 62);
        assert_eq!(comp.mantissas.len(), 2);
    }
}
