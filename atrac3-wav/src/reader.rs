// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RIFF/WAVE reading for ATRAC3 payloads.

use atrac3_core::errors::{decode_error, end_of_stream_error, unsupported_error, Result};

/// WAVE format tag for uncompressed PCM.
pub const WAV_FORMAT_PCM: u16 = 0x0001;

/// WAVE format tag for an ATRAC3 payload.
pub const WAV_FORMAT_ATRAC3: u16 = 0x0270;

/// Stereo block size of the LP2 profile, which WAVE reports as the block alignment.
const LP2_BLOCK_ALIGN: u16 = 384;

/// Data rate of the LP2 profile: 132 kbit/s plus block rounding.
const LP2_BYTES_PER_SEC: u32 = 16538;

/// The contents of a WAVE `fmt ` chunk.
#[derive(Clone, Copy, Debug)]
pub struct WavInfo {
    /// The audio data format tag.
    pub format_tag: u16,
    /// The number of channels.
    pub num_channels: u16,
    /// The sample rate in Hz. For non-PCM formats this is as the format specifies.
    pub sample_rate: u32,
    /// The average data rate in bytes per second.
    pub avg_bytes_per_sec: u32,
    /// The byte alignment of one audio frame.
    pub block_align: u16,
    /// Bits per sample; compressed formats may report 0.
    pub bits_per_sample: u16,
}

impl WavInfo {
    /// Returns true if the format is the ATRAC3 LP2 profile this project decodes: stereo
    /// 384-byte blocks at 16538 bytes per second with no declared sample width.
    pub fn is_atrac3_lp2(&self) -> bool {
        self.format_tag == WAV_FORMAT_ATRAC3
            && self.bits_per_sample == 0
            && self.block_align == LP2_BLOCK_ALIGN
            && self.avg_bytes_per_sec == LP2_BYTES_PER_SEC
            && self.num_channels == 2
    }
}

/// A forward-only little-endian cursor over a byte slice.
struct BufReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BufReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        BufReader { buf, pos: 0 }
    }

    fn bytes_left(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.bytes_left() < len {
            return end_of_stream_error();
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn read_quad(&mut self) -> Result<[u8; 4]> {
        let slice = self.read_slice(4)?;
        Ok([slice[0], slice[1], slice[2], slice[3]])
    }

    fn read_u16(&mut self) -> Result<u16> {
        let slice = self.read_slice(2)?;
        Ok(u16::from_le_bytes([slice[0], slice[1]]))
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_quad()?))
    }

    fn ignore_bytes(&mut self, len: usize) -> Result<()> {
        self.read_slice(len).map(|_| ())
    }
}

fn parse_fmt_chunk(reader: &mut BufReader<'_>, len: u32) -> Result<WavInfo> {
    if len < 16 {
        return decode_error("wav: malformed fmt chunk");
    }

    let info = WavInfo {
        format_tag: reader.read_u16()?,
        num_channels: reader.read_u16()?,
        sample_rate: reader.read_u32()?,
        avg_bytes_per_sec: reader.read_u32()?,
        block_align: reader.read_u16()?,
        bits_per_sample: reader.read_u16()?,
    };

    // Skip any extension data; nothing in it affects ATRAC3 decoding.
    reader.ignore_bytes(len as usize - 16)?;

    Ok(info)
}

/// Parse a RIFF/WAVE file, returning its format description and the raw `data` payload.
///
/// Only little-endian RIFF is accepted; chunks other than `fmt ` and `data` are skipped.
pub fn read_wav(data: &[u8]) -> Result<(WavInfo, &[u8])> {
    let mut reader = BufReader::new(data);

    match &reader.read_quad()? {
        b"RIFF" => (),
        b"RIFX" => return unsupported_error("wav: RIFX is not supported"),
        _ => return decode_error("wav: missing RIFF header"),
    }

    // The declared size covers the stream after this field. Files in the wild also report the
    // total file size; accept both readings and rely on chunk sizes from here on.
    let riff_size = reader.read_u32()? as usize;
    if riff_size > data.len() {
        return decode_error("wav: declared size exceeds the file");
    }

    if &reader.read_quad()? != b"WAVE" {
        return decode_error("wav: not a WAVE file");
    }

    let mut info: Option<WavInfo> = None;

    loop {
        if reader.bytes_left() == 0 {
            return decode_error("wav: missing data chunk");
        }

        let tag = reader.read_quad()?;
        let chunk_len = reader.read_u32()?;

        match &tag {
            b"fmt " => {
                info = Some(parse_fmt_chunk(&mut reader, chunk_len)?);
            }
            b"data" => {
                // The format chunk must precede the data chunk.
                let info = match info {
                    Some(info) => info,
                    None => return decode_error("wav: data chunk before fmt chunk"),
                };

                log::debug!(
                    "wav: format {:#06x}, {} ch, {} Hz, {} byte payload",
                    info.format_tag,
                    info.num_channels,
                    info.sample_rate,
                    chunk_len,
                );

                let payload = reader.read_slice(chunk_len as usize)?;
                return Ok((info, payload));
            }
            _ => {
                // Chunks are word aligned; odd sizes carry a pad byte.
                let skip = (chunk_len as usize) + (chunk_len as usize & 1);
                reader.ignore_bytes(skip)?;
            }
        }
    }
}
