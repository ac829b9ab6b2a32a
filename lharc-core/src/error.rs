//! Error types for lharc operations.
//!
//! Every failure inside a decode session surfaces as one [`LharcError`].
//! Truncated input is reported as [`LharcError::UnexpectedEof`], which is the
//! end-of-stream indicator of the bit reader; the archive layer decides
//! whether that aborts the archive or just the entry.

use std::io;
use thiserror::Error;

/// The main error type for lharc operations.
#[derive(Debug, Error)]
pub enum LharcError {
    /// I/O error from the underlying byte source.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Unsupported or unknown compression method.
    #[error("Unsupported compression method: {method}")]
    UnsupportedMethod {
        /// The compression method identifier.
        method: String,
    },

    /// The byte source ran dry before a read could complete.
    #[error("Unexpected end of stream at bit position {bit_position}")]
    UnexpectedEof {
        /// Number of bits successfully consumed before the failure.
        bit_position: u64,
    },

    /// Corrupted data in the compressed stream.
    #[error("Corrupted data at output offset {offset}: {message}")]
    CorruptedData {
        /// Number of bytes produced when the corruption was detected.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A caller supplied an unusable parameter.
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the problem.
        message: String,
    },
}

/// Result type alias for lharc operations.
pub type Result<T> = std::result::Result<T, LharcError>;

impl LharcError {
    /// Create an unsupported method error.
    pub fn unsupported_method(method: impl Into<String>) -> Self {
        Self::UnsupportedMethod {
            method: method.into(),
        }
    }

    /// Create an unexpected end-of-stream error.
    pub fn unexpected_eof(bit_position: u64) -> Self {
        Self::UnexpectedEof { bit_position }
    }

    /// Create a corrupted data error.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptedData {
            offset,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Whether this error means the input ended early.
    pub fn is_eof(&self) -> bool {
        match self {
            Self::UnexpectedEof { .. } => true,
            Self::Io(e) => e.kind() == io::ErrorKind::UnexpectedEof,
            _ => false,
        }
    }
}

impl From<LharcError> for io::Error {
    fn from(err: LharcError) -> Self {
        match err {
            LharcError::Io(e) => e,
            LharcError::UnexpectedEof { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
