// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `atrac3-core` provides the shared services the Project Atrac3 decoder is built from:
//! error types, an MSB-first bitstream reader, prefix-code (Huffman) decoding, and the
//! inverse MDCT.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod dsp;
pub mod errors;
pub mod io;
