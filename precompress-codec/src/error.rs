//! Error types for codec operations

use crate::Codec;
use thiserror::Error;

/// Errors that can occur while compressing a buffer
#[derive(Error, Debug)]
pub enum CompressionError {
    /// The compressed output is not smaller than the input.
    ///
    /// This is an expected outcome for tiny or incompressible files and
    /// callers treat it as "skip", not as a failure.
    #[error("Compressed size ({compressed} bytes) is not smaller than original ({original} bytes)")]
    SizeIncrease { original: usize, compressed: usize },

    /// The underlying encoder failed
    #[error("Compression failed: {0}")]
    CompressionFailed(String),

    /// The codec was not compiled into this build
    #[error("Codec not available in this build: {0}")]
    Unavailable(Codec),
}

impl CompressionError {
    /// Whether this error is the expected "no benefit" outcome
    pub fn is_size_increase(&self) -> bool {
        matches!(self, Self::SizeIncrease { .. })
    }
}
