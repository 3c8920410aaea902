// Atrac3
// Copyright (c) 2026 The Project Atrac3 Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::io;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Project Atrac3.
#[derive(Debug)]
pub enum Error {
    /// An IO error occurred while reading or writing a stream.
    IoError(io::Error),
    /// The stream contained malformed data and could not be decoded.
    DecodeError(&'static str),
    /// An unsupported container or codec feature was encountered.
    Unsupported(&'static str),
    /// The end of the stream was reached unexpectedly.
    EndOfStream,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::IoError(ref err) => {
                write!(f, "io error: {}", err)
            }
            Error::DecodeError(msg) => {
                write!(f, "malformed stream: {}", msg)
            }
            Error::Unsupported(feature) => {
                write!(f, "unsupported feature: {}", feature)
            }
            Error::EndOfStream => {
                write!(f, "unexpected end of stream")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::IoError(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => Error::EndOfStream,
            _ => Error::IoError(err),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a decode error.
pub fn decode_error<T>(desc: &'static str) -> Result<T> {
    Err(Error::DecodeError(desc))
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(feature: &'static str) -> Result<T> {
    Err(Error::Unsupported(feature))
}

/// Convenience function to create an end-of-stream error.
pub fn end_of_stream_error<T>() -> Result<T> {
    Err(Error::EndOfStream)
}
