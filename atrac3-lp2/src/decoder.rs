// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The stereo LP2 decoder facade.

use atrac3_core::io::BitReader;

use crate::common::*;
use crate::dsp::ChannelState;
use crate::errors::{ParseError, Result};
use crate::unit::SoundUnit;

/// ATRAC3 LP2 stereo decoder.
///
/// Feed [`Atrac3Decoder::decode_block`] consecutive 384-byte stereo blocks; each call appends
/// 1024 samples per channel to the caller-owned output buffers. Samples are 32-bit floats at
/// signed-16-bit numeric scale; converting to `i16` requires clamping and casting.
pub struct Atrac3Decoder {
    left: ChannelState,
    right: ChannelState,
}

impl Atrac3Decoder {
    pub fn new() -> Self {
        Atrac3Decoder { left: ChannelState::new(), right: ChannelState::new() }
    }

    /// Drop all inter-frame state, as after a seek.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }

    /// Decode one stereo block: two 192-byte sound units, left then right.
    ///
    /// On a parse failure nothing is appended and the channel states are left untouched; the
    /// caller discards the frame and may continue with the next block.
    pub fn decode_block(
        &mut self,
        block: &[u8],
        left: &mut Vec<f32>,
        right: &mut Vec<f32>,
    ) -> Result<()> {
        validate!(block.len() == STEREO_BLOCK_BYTES, ParseError::BitstreamExhausted);

        // Parse both channel units before rendering either, so a malformed frame is dropped
        // without disturbing the inter-frame state.
        let mut left_bs = BitReader::new(&block[..SOUND_UNIT_BYTES]);
        let left_unit = SoundUnit::read(&mut left_bs)?;

        let mut right_bs = BitReader::new(&block[SOUND_UNIT_BYTES..]);
        let right_unit = SoundUnit::read(&mut right_bs)?;

        self.left.render(&left_unit, left);
        self.right.render(&right_unit, right);

        Ok(())
    }
}

impl Default for Atrac3Decoder {
    fn default() -> Self {
        Self::new()
    }
}
