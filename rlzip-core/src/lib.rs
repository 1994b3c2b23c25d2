//! # rlzip-core
//!
//! Foundational building blocks shared by the rlzip codec and format crates.
//!
//! - [`crc`]: CRC-32 checksum, as stored in the lzip member trailer
//! - [`error`]: the shared error type
//! - [`traits`]: the `Compressor`/`Decompressor` byte-stream interface
//! - [`mmap`]: memory-mapped file reading for large inputs
//!
//! ## Architecture
//!
//! rlzip is organized as a small stack of layers, each crate owning one:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ rlzip-cli                                                │
//! │     command-line driver: compress/decompress/test/list  │
//! ├─────────────────────────────────────────────────────────┤
//! │ rlzip-format                                             │
//! │     lzip member framing: header, trailer, multi-member   │
//! ├─────────────────────────────────────────────────────────┤
//! │ rlzip-lzma                                               │
//! │     range coder, probability model, state machine,      │
//! │     dictionary + match finders, optimal/fast encoders    │
//! ├─────────────────────────────────────────────────────────┤
//! │ rlzip-core (this crate)                                  │
//! │     CRC-32, error type, byte-stream traits, mmap I/O      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use rlzip_core::crc::Crc32;
//!
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod crc;
pub mod error;
pub mod mmap;
pub mod traits;

// Re-exports for convenience
pub use crc::Crc32;
pub use error::{Error, Result};
pub use mmap::{MmapOptions, MmapReader};
pub use traits::{CompressionLevel, Compressor, Decompressor};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::crc::Crc32;
    pub use crate::error::{Error, Result};
    pub use crate::mmap::{MmapOptions, MmapReader};
    pub use crate::traits::{CompressionLevel, Compressor, Decompressor};
}
