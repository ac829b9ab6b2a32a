//! Pull-loop helpers around a [`Decoder`].
//!
//! Compressed streams carry no end marker: the archive header says how many
//! bytes an entry decodes to, and the caller stops there.

use crate::config::DecoderConfig;
use crate::methods::LhaMethod;
use crate::registry::create_decoder_with;
use lharc_core::error::{LharcError, Result};
use lharc_core::traits::Decoder;
use std::io::{self, Read};

/// Adapts a decoder into [`std::io::Read`], stopping at the entry length.
///
/// Decode failures surface as [`io::Error`]s wrapping the
/// [`LharcError`]; truncated input has kind `UnexpectedEof`.
pub struct DecoderReader<'a> {
    decoder: Box<dyn Decoder + 'a>,
    pending: Vec<u8>,
    pending_pos: usize,
    remaining: u64,
}

impl<'a> DecoderReader<'a> {
    /// Wrap `decoder`, which should decode to `expected_len` bytes.
    pub fn new(decoder: Box<dyn Decoder + 'a>, expected_len: u64) -> Self {
        let capacity = decoder.max_output();
        Self {
            decoder,
            pending: Vec::with_capacity(capacity),
            pending_pos: 0,
            remaining: expected_len,
        }
    }

    /// Bytes still to be returned before the entry is complete.
    pub fn remaining(&self) -> u64 {
        self.remaining + (self.pending.len() - self.pending_pos) as u64
    }

    fn refill(&mut self) -> Result<()> {
        self.pending.clear();
        self.pending_pos = 0;

        let produced = self.decoder.produce(&mut self.pending)?;
        if produced == 0 {
            return Err(LharcError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended {} bytes early", self.remaining),
            )));
        }

        // A copy may run past the declared length; the surplus is discarded.
        let keep = produced.min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        self.pending.truncate(keep);
        self.remaining -= keep as u64;
        Ok(())
    }
}

impl std::fmt::Debug for DecoderReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderReader")
            .field("bytes_produced", &self.decoder.bytes_produced())
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

impl Read for DecoderReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pending_pos == self.pending.len() {
            if self.remaining == 0 {
                return Ok(0);
            }
            self.refill()?;
        }

        let available = &self.pending[self.pending_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.pending_pos += n;
        Ok(n)
    }
}

/// Decode an in-memory stream of `expected_len` bytes.
///
/// # Example
///
/// ```
/// use lharc_codec::{LhaMethod, decode_all};
///
/// let output = decode_all(LhaMethod::Lh0, b"plain", 5).unwrap();
/// assert_eq!(output, b"plain");
/// ```
pub fn decode_all(method: LhaMethod, data: &[u8], expected_len: u64) -> Result<Vec<u8>> {
    decode_all_with(method, data, expected_len, DecoderConfig::default())
}

/// [`decode_all`] with an explicit configuration.
pub fn decode_all_with(
    method: LhaMethod,
    data: &[u8],
    expected_len: u64,
    config: DecoderConfig,
) -> Result<Vec<u8>> {
    let expected = usize::try_from(expected_len)
        .map_err(|_| LharcError::invalid_parameter("expected length exceeds address space"))?;

    let mut decoder = create_decoder_with(method, data, config)?;
    let mut output = Vec::with_capacity(expected.min(data.len().saturating_mul(8)));

    while output.len() < expected {
        if decoder.produce(&mut output)? == 0 {
            return Err(LharcError::unexpected_eof(data.len() as u64 * 8));
        }
    }

    output.truncate(expected);
    Ok(output)
}
