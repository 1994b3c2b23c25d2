//! # rlzip-lzma
//!
//! A from-scratch LZMA1 codec: range coder, adaptive probability models,
//! hash-chain and binary-tree match finders, and both a greedy and a
//! genuine price-driven optimal parser.
//!
//! This crate produces and consumes raw LZMA streams only - no container
//! framing. `rlzip-format` wraps a stream produced here in lzip's member
//! header/trailer.
//!
//! ## Compression
//!
//! ```ignore
//! use rlzip_lzma::{encode, EncoderOptions};
//! use rlzip_core::CompressionLevel;
//!
//! let opts = EncoderOptions::from_level(CompressionLevel::DEFAULT);
//! let compressed = encode(b"hello world", &opts, Vec::new())?;
//! ```
//!
//! ## Decompression
//!
//! ```ignore
//! use rlzip_lzma::decode;
//!
//! let mut out = Vec::new();
//! decode(&compressed[..], opts.dict_size, &mut out)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod dictionary;
pub mod encoder;
pub mod fast;
pub mod match_finder;
pub mod model;
pub mod optimal;
pub mod price;
pub mod range_coder;

pub use decoder::decode;
pub use dictionary::Dictionary;
pub use encoder::{EncoderOptions, encode};
pub use match_finder::{MatchCandidate, MatchFinder};
pub use model::{LzmaModel, LzmaProperties, State};
pub use optimal::{OptimalParser, Packet, apply_packet};
pub use range_coder::{RangeDecoder, RangeEncoder};
