//! Decoder configuration.

use lharc_core::bitstream::DEFAULT_CHUNK_SIZE;
use lharc_core::error::{LharcError, Result};

/// Decode session parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Fail on malformed tree headers instead of building a degraded tree.
    ///
    /// Lenient builds silently cap tree allocation, drop queue entries past
    /// the queue capacity, and hand out the root slot when the queue runs
    /// dry. Strict mode turns each of those into
    /// [`LharcError::CorruptedData`].
    pub strict_trees: bool,
    /// Number of bytes pulled from the byte source at a time.
    pub input_chunk: usize,
}

impl DecoderConfig {
    /// Tolerates malformed trees, as deployed PMarc decoders do.
    pub const LENIENT: Self = Self {
        strict_trees: false,
        input_chunk: DEFAULT_CHUNK_SIZE,
    };

    /// Rejects malformed trees.
    pub const STRICT: Self = Self {
        strict_trees: true,
        input_chunk: DEFAULT_CHUNK_SIZE,
    };

    /// Set the input chunk size.
    pub fn with_input_chunk(mut self, input_chunk: usize) -> Self {
        self.input_chunk = input_chunk;
        self
    }

    /// Check the parameters.
    pub fn validate(&self) -> Result<()> {
        if self.input_chunk == 0 {
            return Err(LharcError::invalid_parameter(
                "input_chunk must be greater than 0",
            ));
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::LENIENT
    }
}
