// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `atrac3-lp2` is a decoder for ATRAC3 in its LP2 profile: independent-channel stereo at
//! 132 kbit/s and 44.1 kHz, carried as back-to-back 384-byte stereo blocks of two 192-byte
//! sound units each.
//!
//! The joint-stereo LP4 profile and encoding are out of scope.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod codebooks;
mod common;
mod decoder;
mod dsp;
mod errors;
mod gain;
mod qmf;
mod tables;
mod unit;

pub use common::{CodingMode, FRAME_SAMPLES, SOUND_UNIT_BYTES, STEREO_BLOCK_BYTES};
pub use decoder::Atrac3Decoder;
pub use dsp::ChannelState;
pub use errors::{ParseError, Result};
pub use unit::{GainPoint, SoundUnit, SpectralSubband, TonalComponent, TonalGroup};
