//! Pass-through decoder for stored entries (`-lh0-`, `-lz4-`, `-pm0-`).

use lharc_core::bitstream::BitReader;
use lharc_core::error::Result;
use lharc_core::source::ByteSource;
use lharc_core::traits::Decoder;

/// Copies the source to the output unchanged.
#[derive(Debug)]
pub struct StoredDecoder<S: ByteSource> {
    reader: BitReader<S>,
    chunk_size: usize,
    bytes_produced: u64,
}

impl<S: ByteSource> StoredDecoder<S> {
    /// Create a decoder that emits at most `chunk_size` bytes per call.
    pub fn new(source: S, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            reader: BitReader::with_chunk_size(source, chunk_size),
            chunk_size,
            bytes_produced: 0,
        }
    }
}

impl<S: ByteSource> Decoder for StoredDecoder<S> {
    fn max_output(&self) -> usize {
        self.chunk_size
    }

    /// Returns `Ok(0)` once the source is exhausted.
    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        out.resize(start + self.chunk_size, 0);
        let n = match self.reader.read_aligned(&mut out[start..]) {
            Ok(n) => n,
            Err(e) => {
                out.truncate(start);
                return Err(e);
            }
        };
        out.truncate(start + n);
        self.bytes_produced += n as u64;
        Ok(n)
    }

    fn bytes_produced(&self) -> u64 {
        self.bytes_produced
    }
}
