//! Error types for rlzip operations.
//!
//! This module provides a single error type shared by the codec and format
//! crates, covering I/O failure, malformed wire data, and the internal
//! consistency checks the codec performs on itself.

use std::io;
use thiserror::Error;

/// The main error type for rlzip operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Allocation would exceed a sane bound (e.g. an absurd dictionary size).
    #[error("out of memory: {message}")]
    OutOfMemory {
        /// Description of what allocation was refused.
        message: String,
    },

    /// Member header magic did not match `LZIP`.
    #[error("bad magic: expected \"LZIP\", found {found:02x?}")]
    BadMagic {
        /// The four bytes actually read.
        found: [u8; 4],
    },

    /// Member header version byte is not one this implementation understands.
    #[error("unsupported version: {version}")]
    UnsupportedVersion {
        /// The version byte read from the header.
        version: u8,
    },

    /// The header's coded dictionary-size byte does not decode to a valid size.
    #[error("bad dictionary size byte: {byte:#04x}")]
    BadDictionarySize {
        /// The offending byte.
        byte: u8,
    },

    /// Compressed data failed to decode: a bad range-coder bit, an
    /// out-of-range distance, or a trailer that doesn't match the data.
    #[error("data error: {message}")]
    DataError {
        /// Description of what check failed.
        message: String,
    },

    /// Bytes remained after the last member under a `Strict` trailing-data policy.
    #[error("trailing garbage: {extra} byte(s) after last member")]
    TrailingGarbage {
        /// Number of trailing bytes found.
        extra: u64,
    },

    /// An invariant the codec itself is supposed to maintain was violated.
    #[error("internal error: {message}")]
    InternalError {
        /// Description of the violated invariant.
        message: String,
    },
}

/// Result type alias for rlzip operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an out-of-memory error.
    pub fn out_of_memory(message: impl Into<String>) -> Self {
        Self::OutOfMemory {
            message: message.into(),
        }
    }

    /// Create a bad-magic error.
    pub fn bad_magic(found: [u8; 4]) -> Self {
        Self::BadMagic { found }
    }

    /// Create an unsupported-version error.
    pub fn unsupported_version(version: u8) -> Self {
        Self::UnsupportedVersion { version }
    }

    /// Create a bad-dictionary-size error.
    pub fn bad_dictionary_size(byte: u8) -> Self {
        Self::BadDictionarySize { byte }
    }

    /// Create a data error.
    pub fn data_error(message: impl Into<String>) -> Self {
        Self::DataError {
            message: message.into(),
        }
    }

    /// Create a trailing-garbage error.
    pub fn trailing_garbage(extra: u64) -> Self {
        Self::TrailingGarbage { extra }
    }

    /// Create an internal-error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }
}
