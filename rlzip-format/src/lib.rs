//! # rlzip-format
//!
//! lzip (.lz) member framing: the 6-byte header, 20-byte trailer, and the
//! rules for reading/writing streams of concatenated members.
//!
//! This crate knows nothing about the LZMA bitstream itself - that's
//! [`rlzip_lzma`] - it just wires a header and trailer around whatever that
//! crate produces or consumes, and decides what to do with bytes that don't
//! look like a member.
//!
//! ## Compression
//!
//! ```
//! use rlzip_format::member::write_member;
//! use rlzip_lzma::EncoderOptions;
//! use rlzip_core::CompressionLevel;
//!
//! let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
//! let mut out = Vec::new();
//! let info = write_member(b"hello\n", &opts, &mut out).unwrap();
//! assert_eq!(info.data_crc, 0xC63B_4682);
//! ```
//!
//! ## Decompression
//!
//! ```
//! use rlzip_format::member::{read_member, write_member};
//! use rlzip_format::stream::TrailingDataPolicy;
//! use rlzip_lzma::EncoderOptions;
//! use rlzip_core::CompressionLevel;
//! use std::io::Cursor;
//!
//! let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
//! let mut compressed = Vec::new();
//! write_member(b"hello\n", &opts, &mut compressed).unwrap();
//!
//! let mut out = Vec::new();
//! let (info, _) = read_member(Cursor::new(compressed), &mut out).unwrap();
//! assert_eq!(out, b"hello\n");
//! assert_eq!(info.data_size, 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod header;
pub mod member;
pub mod stream;
pub mod trailer;

pub use header::LzipHeader;
pub use member::{MemberInfo, read_member, write_member};
pub use stream::{TrailingDataPolicy, decode_stream, encode_stream};
pub use trailer::LzipTrailer;
