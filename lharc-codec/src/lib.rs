//! # lharc codec
//!
//! Pure Rust decoders for the LArc/LHarc/PMarc family of archive compression
//! methods.
//!
//! Decoders are pull-based: each [`Decoder::produce`] call decodes one
//! output unit (a literal or a back-reference copy) and pulls more
//! compressed bytes from its [`ByteSource`] only when it needs them.
//! Supported methods:
//!
//! - **lh0 / lz4 / pm0**: Stored (no compression)
//! - **lh4 / lh5 / lh6 / lh7**: LHarc, 4-64 KB window, static Huffman trees
//!   sent per block
//! - **lzs**: LArc, 2 KB window, flag-bit LZSS
//! - **pm2**: PMarc, 8 KB window, adaptive Huffman trees with a move-to-front
//!   literal history
//!
//! The remaining LHA ids (`-lh1-`, `-lz5-`, `-pm1-`) are recognised by
//! [`LhaMethod`] but rejected by the registry.
//!
//! ## Example
//!
//! ```rust
//! use lharc_codec::{LhaMethod, create_decoder};
//! use lharc_core::Decoder;
//!
//! let mut decoder = create_decoder(LhaMethod::Pm0, &b"Hello"[..]).unwrap();
//! let mut out = Vec::new();
//! while decoder.produce(&mut out).unwrap() > 0 {}
//! assert_eq!(out, b"Hello");
//! ```
//!
//! ## Streaming
//!
//! [`DecoderReader`] turns a session into a [`std::io::Read`] that stops at
//! the entry length recorded in the archive header:
//!
//! ```rust
//! use std::io::Read;
//! use lharc_codec::{DecoderReader, create_decoder_by_id};
//!
//! let decoder = create_decoder_by_id(b"-lh0-", &b"Hello, World!"[..]).unwrap();
//! let mut reader = DecoderReader::new(decoder, 5);
//! let mut text = String::new();
//! reader.read_to_string(&mut text).unwrap();
//! assert_eq!(text, "Hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod history;
pub mod lh;
pub mod lzs;
pub mod methods;
pub mod pm2;
pub mod registry;
pub mod stored;
pub mod stream;
pub mod tree;

// Re-exports
pub use config::DecoderConfig;
pub use history::ByteHistory;
pub use lh::LhDecoder;
pub use lzs::LzsDecoder;
pub use methods::LhaMethod;
pub use pm2::{Pm2Decoder, RebuildState};
pub use registry::{create_decoder, create_decoder_by_id, create_decoder_with};
pub use stored::StoredDecoder;
pub use stream::{DecoderReader, decode_all, decode_all_with};
pub use tree::{BuildReport, HuffmanTree, Node};

pub use lharc_core::{ByteSource, Decoder, LharcError, Result};
