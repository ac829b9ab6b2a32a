//! LArc `-lzs-` decoder.
//!
//! LZSS with a 2 KB window: a 1-bit flag selects either an 8-bit literal or
//! an 11-bit absolute window position plus a 4-bit length.

use lharc_core::bitstream::BitReader;
use lharc_core::error::Result;
use lharc_core::ringbuffer::{RingBuffer, sizes};
use lharc_core::source::ByteSource;
use lharc_core::traits::Decoder;

/// Size of the history ring buffer.
pub const RING_BUFFER_SIZE: usize = sizes::LZS;

/// Longest copy (4-bit length plus 2).
pub const MAX_OUTPUT: usize = 17;

/// Minimum copy length.
const MIN_MATCH: usize = 2;

/// Write cursor at stream start.
const START_POSITION: usize = RING_BUFFER_SIZE - MAX_OUTPUT;

/// Decode session for one `-lzs-` stream.
#[derive(Debug)]
pub struct LzsDecoder<S: ByteSource> {
    reader: BitReader<S>,
    ring: RingBuffer,
    bytes_produced: u64,
}

impl<S: ByteSource> LzsDecoder<S> {
    /// Create a decoder pulling `input_chunk` bytes at a time.
    pub fn new(source: S, input_chunk: usize) -> Self {
        let mut ring = RingBuffer::new(RING_BUFFER_SIZE, b' ');
        ring.set_position(START_POSITION);
        Self {
            reader: BitReader::with_chunk_size(source, input_chunk),
            ring,
            bytes_produced: 0,
        }
    }

    fn emit(&mut self, byte: u8, out: &mut Vec<u8>) {
        self.ring.push(byte);
        out.push(byte);
        self.bytes_produced += 1;
    }
}

impl<S: ByteSource> Decoder for LzsDecoder<S> {
    fn max_output(&self) -> usize {
        MAX_OUTPUT
    }

    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        if self.reader.read_bit()? {
            let byte = self.reader.read_byte()?;
            self.emit(byte, out);
            return Ok(1);
        }

        let position = usize::from(self.reader.read_bits(11)?);
        let length = usize::from(self.reader.read_bits(4)?) + MIN_MATCH;
        for i in 0..length {
            let byte = self.ring.byte_at(position + i);
            self.emit(byte, out);
        }
        Ok(length)
    }

    fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }
}
