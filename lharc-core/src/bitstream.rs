//! MSB-first bit-level I/O.
//!
//! The LArc/LHarc/PMarc family packs codes most-significant bit first within
//! each byte. [`BitReader`] pulls bytes from a [`ByteSource`] and hands them
//! out one bit at a time; [`BitWriter`] is the mirror image and is used to
//! synthesise streams for tests and benchmarks.
//!
//! # Example
//!
//! ```
//! use lharc_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let data = writer.finish();
//!
//! let mut reader = BitReader::new(data.as_slice());
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::{LharcError, Result};
use crate::source::ByteSource;

/// Default number of bytes requested from the source per pull.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// A bit-level reader over a [`ByteSource`], MSB-first.
///
/// The reader keeps the byte currently being consumed plus the rest of the
/// chunk it was pulled with. It never rewinds.
#[derive(Debug)]
pub struct BitReader<S: ByteSource> {
    /// Underlying byte source.
    source: S,
    /// Bytes pulled from the source but not yet consumed.
    chunk: Vec<u8>,
    /// Next unread index into `chunk`.
    chunk_pos: usize,
    /// Valid length of `chunk`.
    chunk_len: usize,
    /// Byte currently being consumed.
    current: u8,
    /// Bits of `current` not yet handed out (0..=8).
    bits_left: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
    /// Set once the source reported exhaustion.
    exhausted: bool,
}

impl<S: ByteSource> BitReader<S> {
    /// Create a new `BitReader` with the default chunk size.
    pub fn new(source: S) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Create a new `BitReader` that pulls `chunk_size` bytes at a time.
    ///
    /// A chunk size of zero is treated as one.
    pub fn with_chunk_size(source: S, chunk_size: usize) -> Self {
        Self {
            source,
            chunk: vec![0; chunk_size.max(1)],
            chunk_pos: 0,
            chunk_len: 0,
            current: 0,
            bits_left: 0,
            total_bits_read: 0,
            exhausted: false,
        }
    }

    /// Get the total number of bits read so far.
    pub fn bits_read(&self) -> u64 {
        self.total_bits_read
    }

    /// Load the next byte into `current`.
    fn next_byte(&mut self) -> Result<()> {
        if self.chunk_pos >= self.chunk_len {
            if self.exhausted {
                return Err(LharcError::unexpected_eof(self.total_bits_read));
            }
            let n = self.source.pull(&mut self.chunk)?;
            if n == 0 {
                log::trace!("byte source exhausted after {} bits", self.total_bits_read);
                self.exhausted = true;
                return Err(LharcError::unexpected_eof(self.total_bits_read));
            }
            self.chunk_len = n;
            self.chunk_pos = 0;
        }

        self.current = self.chunk[self.chunk_pos];
        self.chunk_pos += 1;
        self.bits_left = 8;
        Ok(())
    }

    /// Read up to 16 bits, most significant bit first.
    ///
    /// Fails with [`LharcError::UnexpectedEof`] if the source runs dry before
    /// `count` bits could be supplied.
    pub fn read_bits(&mut self, count: u8) -> Result<u16> {
        debug_assert!(count <= 16, "Cannot read more than 16 bits at once");

        let mut value = 0u32;
        let mut remaining = count;

        while remaining > 0 {
            if self.bits_left == 0 {
                self.next_byte()?;
            }

            let take = remaining.min(self.bits_left);
            let shift = self.bits_left - take;
            let bits = (u32::from(self.current) >> shift) & ((1u32 << take) - 1);

            value = (value << take) | bits;
            self.bits_left -= take;
            remaining -= take;
            self.total_bits_read += u64::from(take);
        }

        Ok(value as u16)
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read the next eight bits as a byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Copy up to `buf.len()` bytes straight from the stream.
    ///
    /// The reader must be byte-aligned. Returns 0 only at end of input.
    pub fn read_aligned(&mut self, buf: &mut [u8]) -> Result<usize> {
        debug_assert_eq!(self.bits_left, 0, "reader is not byte-aligned");

        if buf.is_empty() {
            return Ok(0);
        }

        let written = if self.chunk_pos < self.chunk_len {
            let n = (self.chunk_len - self.chunk_pos).min(buf.len());
            buf[..n].copy_from_slice(&self.chunk[self.chunk_pos..self.chunk_pos + n]);
            self.chunk_pos += n;
            n
        } else if self.exhausted {
            0
        } else {
            let n = self.source.pull(buf)?;
            if n == 0 {
                self.exhausted = true;
            }
            n
        };

        self.total_bits_read += written as u64 * 8;
        Ok(written)
    }
}

/// A bit-level writer that accumulates MSB-first output in memory.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    /// Completed bytes.
    output: Vec<u8>,
    /// Pending bits, right-aligned.
    buffer: u32,
    /// Number of pending bits (0..8).
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn write_bits(&mut self, value: u32, count: u8) {
        debug_assert!(count <= 24, "Cannot write more than 24 bits at once");

        if count == 0 {
            return;
        }

        let mask = (1u32 << count) - 1;
        self.buffer = (self.buffer << count) | (value & mask);
        self.bits_in_buffer += count;
        self.total_bits_written += u64::from(count);

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            self.output.push(byte);
            self.bits_in_buffer -= 8;
        }
        self.buffer &= (1u32 << self.bits_in_buffer) - 1;
    }

    /// Write a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        self.write_bits(u32::from(bit), 1);
    }

    /// Pad the final partial byte with zeros and return the bytes.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bits_in_buffer > 0 {
            let padding = 8 - self.bits_in_buffer;
            self.output.push((self.buffer << padding) as u8);
        }
        self.output
    }
}
