//! Error types for per-file compression tasks

use precompress_codec::CompressionError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single task. They never abort the batch.
#[derive(Error, Debug)]
pub enum TaskError {
    /// The source file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The artifact could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stale artifact could not be removed
    #[error("Failed to remove {}: {source}", .path.display())]
    Remove {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Checking for an existing artifact failed
    #[error("Failed to inspect {}: {source}", .path.display())]
    Inspect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The codec failed for a reason other than size increase
    #[error(transparent)]
    Compression(#[from] CompressionError),
}

/// Result type for task operations
pub type Result<T> = std::result::Result<T, TaskError>;
