//! Byte sources feeding the bit reader.
//!
//! A decode session never sees files or sockets directly. It pulls raw
//! compressed bytes through [`ByteSource`], which keeps the decoders agnostic
//! to whether the data lives in memory, in a file, or arrives over a network.

use crate::error::Result;
use std::io::{self, Read};

/// A producer of compressed bytes.
pub trait ByteSource {
    /// Pull the next chunk of bytes into `buf`.
    ///
    /// Returns the number of bytes written. `Ok(0)` means there is no more
    /// data; a source must keep returning `Ok(0)` once exhausted.
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).pull(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).pull(buf)
    }
}

impl ByteSource for &[u8] {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.len());
        let (head, tail) = self.split_at(n);
        buf[..n].copy_from_slice(head);
        *self = tail;
        Ok(n)
    }
}

/// Adapts any [`Read`] implementation into a [`ByteSource`].
///
/// Interrupted reads are retried; every other I/O error is propagated.
#[derive(Debug)]
pub struct ReadSource<R: Read> {
    reader: R,
}

impl<R: Read> ReadSource<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Consume the adapter and return the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteSource for ReadSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.reader.read(buf) {
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// A byte source backed by a pull callback.
///
/// The closure carries whatever context it needs by capture.
///
/// ```
/// use lharc_core::source::{ByteSource, FnSource};
///
/// let mut remaining = 3u8;
/// let mut source = FnSource::new(move |buf: &mut [u8]| {
///     if remaining == 0 || buf.is_empty() {
///         return Ok(0);
///     }
///     buf[0] = remaining;
///     remaining -= 1;
///     Ok(1)
/// });
///
/// let mut buf = [0u8; 4];
/// assert_eq!(source.pull(&mut buf).unwrap(), 1);
/// assert_eq!(buf[0], 3);
/// ```
pub struct FnSource<F>
where
    F: FnMut(&mut [u8]) -> Result<usize>,
{
    callback: F,
}

impl<F> FnSource<F>
where
    F: FnMut(&mut [u8]) -> Result<usize>,
{
    /// Create a source from a pull callback.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ByteSource for FnSource<F>
where
    F: FnMut(&mut [u8]) -> Result<usize>,
{
    fn pull(&mut self, buf: &mut [u8]) -> Result<usize> {
        (self.callback)(buf)
    }
}

impl<F> std::fmt::Debug for FnSource<F>
where
    F: FnMut(&mut [u8]) -> Result<usize>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSource").finish_non_exhaustive()
    }
}
