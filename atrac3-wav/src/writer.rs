// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Streaming 16-bit PCM WAV output.

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use atrac3_core::errors::Result;

/// Offset of the RIFF size field within the header.
const RIFF_SIZE_OFFSET: u64 = 4;

/// Offset of the data chunk size field within the header.
const DATA_SIZE_OFFSET: u64 = 40;

/// Total header size: RIFF (12), fmt header (8), fmt payload (16), data header (8).
const HEADER_SIZE: u32 = 44;

/// A streaming writer for interleaved 16-bit PCM WAV files.
///
/// The header is written with placeholder sizes and patched by [`WavWriter::finalize`]; a
/// writer dropped without finalizing patches on a best-effort basis.
pub struct WavWriter {
    out: BufWriter<File>,
    num_channels: u16,
    data_bytes: u32,
    finalized: bool,
}

impl WavWriter {
    /// Create the output file and write its provisional header.
    pub fn create<P: AsRef<Path>>(path: P, num_channels: u16, sample_rate: u32) -> Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);

        let bytes_per_frame = num_channels * 2;

        out.write_all(b"RIFF")?;
        out.write_all(&0u32.to_le_bytes())?; // patched on finalize
        out.write_all(b"WAVE")?;

        out.write_all(b"fmt ")?;
        out.write_all(&16u32.to_le_bytes())?;
        out.write_all(&super::WAV_FORMAT_PCM.to_le_bytes())?;
        out.write_all(&num_channels.to_le_bytes())?;
        out.write_all(&sample_rate.to_le_bytes())?;
        out.write_all(&(sample_rate * u32::from(bytes_per_frame)).to_le_bytes())?;
        out.write_all(&bytes_per_frame.to_le_bytes())?;
        out.write_all(&16u16.to_le_bytes())?;

        out.write_all(b"data")?;
        out.write_all(&0u32.to_le_bytes())?; // patched on finalize

        Ok(WavWriter { out, num_channels, data_bytes: 0, finalized: false })
    }

    /// Append non-interleaved stereo samples at signed-16-bit numeric scale. Values outside
    /// [-32768, 32767] are clamped. When the two buffers differ in length the shorter one
    /// bounds the write. Returns the number of sample frames written.
    pub fn append_stereo(&mut self, left: &[f32], right: &[f32]) -> Result<usize> {
        debug_assert_eq!(self.num_channels, 2);

        let num_frames = left.len().min(right.len());
        for (&l, &r) in left.iter().zip(right.iter()) {
            self.out.write_all(&clamp_to_i16(l).to_le_bytes())?;
            self.out.write_all(&clamp_to_i16(r).to_le_bytes())?;
        }
        self.data_bytes += (num_frames as u32) * 4;

        Ok(num_frames)
    }

    /// Patch the header sizes and flush the file.
    pub fn finalize(&mut self) -> Result<()> {
        self.finalized = true;

        self.out.seek(SeekFrom::Start(RIFF_SIZE_OFFSET))?;
        self.out.write_all(&(HEADER_SIZE - 8 + self.data_bytes).to_le_bytes())?;

        self.out.seek(SeekFrom::Start(DATA_SIZE_OFFSET))?;
        self.out.write_all(&self.data_bytes.to_le_bytes())?;

        self.out.seek(SeekFrom::End(0))?;
        self.out.flush()?;

        Ok(())
    }
}

impl Drop for WavWriter {
    fn drop(&mut self) {
        if !self.finalized {
            if let Err(err) = self.finalize() {
                log::warn!("wav: failed to finalize output: {}", err);
            }
        }
    }
}

fn clamp_to_i16(value: f32) -> i16 {
    value.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_clamp_to_i16() {
        assert_eq!(clamp_to_i16(0.0), 0);
        assert_eq!(clamp_to_i16(1000.4), 1000);
        assert_eq!(clamp_to_i16(40000.0), 32767);
        assert_eq!(clamp_to_i16(-40000.0), -32768);
        assert_eq!(clamp_to_i16(f32::NAN), 0);
    }

    #[test]
    fn verify_written_file_round_trips() {
        let path = std::env::temp_dir().join("atrac3_wav_writer_test.wav");

        {
            let mut writer = WavWriter::create(&path, 2, 44100).unwrap();
            let left = [0.0f32, 16384.0, -16384.0];
            let right = [1.0f32, -1.0, 32767.0];
            assert_eq!(writer.append_stereo(&left, &right).unwrap(), 3);
            writer.finalize().unwrap();
        }

        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let (info, data) = crate::read_wav(&bytes).unwrap();
        assert_eq!(info.format_tag, crate::WAV_FORMAT_PCM);
        assert_eq!(info.num_channels, 2);
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(data.len(), 12);

        let sample = |i: usize| i16::from_le_bytes([data[2 * i], data[2 * i + 1]]);
        assert_eq!(sample(0), 0);
        assert_eq!(sample(1), 1);
        assert_eq!(sample(2), 16384);
        assert_eq!(sample(3), -1);
    }
}
