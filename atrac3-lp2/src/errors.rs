// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Structured errors reported by the sound-unit parser.

use std::error;
use std::fmt;
use std::result;

use atrac3_core::errors::Error;

/// `ParseError` enumerates the ways a 192-byte sound unit can fail to parse. All of them are
/// non-recoverable at the sound-unit level: the frame must be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A read ran past the end of the channel unit.
    BitstreamExhausted,
    /// The sound unit header did not carry the LP2 magic value.
    BadMagic,
    /// The reserved tonal coding-mode value was encoded.
    InvalidCodingMode,
    /// A tonal group declared a quantization step index of 0 or 1.
    InvalidQuantStep,
    /// A tonal group carried more than 64 components.
    TooManyTonalComponents,
    /// No Huffman codeword matched within 8 bits.
    HuffmanDecodeFailure,
    /// A spectral subband index fell outside the fixed offset table.
    SubbandIndexOutOfRange,
}

impl ParseError {
    fn as_str(&self) -> &'static str {
        match *self {
            ParseError::BitstreamExhausted => "atrac3: sound unit bitstream exhausted",
            ParseError::BadMagic => "atrac3: bad sound unit magic header",
            ParseError::InvalidCodingMode => "atrac3: reserved tonal coding mode",
            ParseError::InvalidQuantStep => "atrac3: invalid tonal quantization step",
            ParseError::TooManyTonalComponents => "atrac3: too many tonal components in group",
            ParseError::HuffmanDecodeFailure => "atrac3: huffman decode failure",
            ParseError::SubbandIndexOutOfRange => "atrac3: spectral subband index out of range",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for ParseError {}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::DecodeError(err.as_str())
    }
}

pub type Result<T> = result::Result<T, ParseError>;
