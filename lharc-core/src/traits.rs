//! The decoder contract shared by every compression method.
//!
//! Archive readers hold a `Box<dyn Decoder>` per entry and only call through
//! this trait, so the method can change from one entry to the next without
//! the caller knowing which variant is running.

use crate::error::Result;

/// A pull-based decode session for one compressed stream.
///
/// A session owns its bit reader, trees and history exclusively. It is
/// created once per stream and dropped when the caller is done; there is no
/// in-flight work to cancel.
pub trait Decoder {
    /// Upper bound on the number of bytes a single [`produce`](Self::produce)
    /// call can append.
    fn max_output(&self) -> usize;

    /// Decode the next output unit, appending it to `out`.
    ///
    /// Returns the number of bytes appended. `Ok(0)` means the stream ended
    /// cleanly (only methods that can detect this return it). Compressed
    /// methods report truncated input as
    /// [`LharcError::UnexpectedEof`](crate::error::LharcError::UnexpectedEof);
    /// a session that has returned an error must not be used again.
    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize>;

    /// Total bytes produced by this session so far.
    fn bytes_produced(&self) -> u64;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn max_output(&self) -> usize {
        (**self).max_output()
    }

    fn produce(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        (**self).produce(out)
    }

    fn bytes_produced(&self) -> u64 {
        (**self).bytes_produced()
    }
}
