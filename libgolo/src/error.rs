//! Error types for the golo codecs.
//!
//! All public APIs that can fail return `Result<T, CodecError>`.

use std::fmt;
use std::io;

/// Result type alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Debug)]
pub enum CodecError {
    /// A configuration value was rejected at call entry (`m = 0`,
    /// predictor out of range, zero block size, ...).
    InvalidParameter(String),
    /// An I/O error on the underlying byte source or sink.
    Io(io::Error),
    /// The input is not in the expected format (wrong magic, unsupported
    /// sample layout, bad PPM header).
    InvalidFormat(String),
    /// The compressed bitstream is malformed or truncated.
    CorruptStream(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::Io(err) => write!(f, "i/o error: {err}"),
            Self::InvalidFormat(msg) => write!(f, "invalid format: {msg}"),
            Self::CorruptStream(msg) => write!(f, "corrupt stream: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}
