//! # lharc core
//!
//! Core components for the lharc decoders.
//!
//! This crate provides the building blocks every decode session shares:
//!
//! - [`source`]: Byte sources the bit reader pulls compressed data from
//! - [`bitstream`]: MSB-first bit reader (and a writer for synthesising streams)
//! - [`ringbuffer`]: History window for back-reference copies
//! - [`traits`]: The [`Decoder`] contract implemented by every method
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Archive layer (headers, CRC, extraction) - external     │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec (lharc-codec)                                 │
//! │     pm2, lh4-lh7, lzs, stored; Huffman trees; registry │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     ByteSource, BitReader, RingBuffer, Decoder         │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use lharc_core::bitstream::BitReader;
//! use lharc_core::ringbuffer::RingBuffer;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data[..]);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! let mut ring = RingBuffer::new(8, b' ');
//! ring.push(b'x');
//! assert_eq!(ring.read_at(1), b'x');
//! assert_eq!(ring.read_at(2), b' ');
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod error;
pub mod ringbuffer;
pub mod source;
pub mod traits;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use error::{LharcError, Result};
pub use ringbuffer::RingBuffer;
pub use source::{ByteSource, FnSource, ReadSource};
pub use traits::Decoder;
