//! History ring buffer for LZ-style back-references.
//!
//! The buffer stores the most recent `capacity` output bytes and wraps when
//! full. Every index is reduced modulo the capacity, so a corrupt offset can
//! only ever fetch stale history, never touch memory outside the buffer.
//!
//! # Sizes
//!
//! - LArc lzs: 2 KB (2048 bytes)
//! - PMarc pm2: 8 KB (8192 bytes)
//! - LHarc lh4 to lh7: 4, 8, 32 and 64 KB

/// Common window sizes for the supported methods.
pub mod sizes {
    /// Window size for LArc lzs (2 KB).
    pub const LZS: usize = 2048;
    /// Window size for PMarc pm2 (8 KB).
    pub const PM2: usize = 8192;
}

/// A fixed-capacity circular byte buffer with a write cursor.
///
/// Unlike a plain sliding window, the buffer starts out filled with a
/// format-defined byte rather than being "empty": streams may legally copy
/// from history before anything has been written.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create a ring buffer of `capacity` bytes, every byte set to `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize, fill: u8) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );

        Self {
            buffer: vec![fill; capacity],
            position: 0,
            mask: capacity - 1,
        }
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the write cursor to an absolute position (reduced modulo capacity).
    pub fn set_position(&mut self, position: usize) {
        self.position = position & self.mask;
    }

    /// Append a byte at the write cursor, overwriting the oldest byte.
    #[inline]
    pub fn push(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
    }

    /// Read the byte `distance` positions behind the write cursor.
    ///
    /// Distance 1 is the most recently pushed byte. Distances wrap: 0 and
    /// `capacity` both name the oldest slot, the one the next push overwrites.
    #[inline]
    pub fn read_at(&self, distance: usize) -> u8 {
        self.buffer[self.position.wrapping_sub(distance) & self.mask]
    }

    /// Read the byte stored at an absolute position (reduced modulo capacity).
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        self.buffer[index & self.mask]
    }
}
