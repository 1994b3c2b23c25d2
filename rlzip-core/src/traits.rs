//! Core traits for the compression/decompression byte-stream interface.

use crate::error::Result;
use std::io::{Read, Write};

/// A streaming decompressor: consumes a compressed `Read` stream and
/// produces the decompressed bytes on a `Write` stream.
///
/// Implementations run to completion in one call rather than exposing a
/// chunked push/pull interface — lzip members don't support random access
/// or partial decoding, so there is nothing to gain from a stateful step
/// function here.
pub trait Decompressor<R: Read, W: Write> {
    /// Decompress `input` fully, writing the result to `output`.
    ///
    /// Returns the number of decompressed bytes written.
    fn decompress(&mut self, input: R, output: W) -> Result<u64>;
}

/// A streaming compressor: consumes a raw `Read` stream and produces
/// compressed bytes on a `Write` stream.
pub trait Compressor<R: Read, W: Write> {
    /// Compress all of `input`, writing the result to `output`.
    ///
    /// Returns the number of compressed bytes written.
    fn compress(&mut self, input: R, output: W) -> Result<u64>;
}

/// Compression level for algorithms that support it (0 = fastest, 9 = best).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9), clamped to range.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_level() {
        assert_eq!(CompressionLevel::NONE.level(), 0);
        assert_eq!(CompressionLevel::FAST.level(), 1);
        assert_eq!(CompressionLevel::DEFAULT.level(), 6);
        assert_eq!(CompressionLevel::BEST.level(), 9);

        assert_eq!(CompressionLevel::new(100).level(), 9);
    }
}
