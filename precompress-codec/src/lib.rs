//! Codec adapters for static asset pre-compression
//!
//! This crate wraps every supported compression algorithm behind one
//! uniform call, [`Codec::compress`], which always uses the strongest
//! one-shot setting of the codec. The work happens once at build time, so
//! build cost is traded for the smallest artifact a web server can serve.
//!
//! # Features
//!
//! - gzip is always compiled in
//! - `brotli` - Enable brotli compression (enabled by default)
//! - `zopfli` - Enable zopfli, a gzip-compatible encoder with smaller output
//! - `zstd` - Enable zstd compression
//! - `full` - Enable all compression algorithms
//!
//! # Example
//!
//! ```rust
//! use precompress_codec::{Codec, CompressionError};
//!
//! let html = b"<p>hello</p>".repeat(20);
//! let gz = Codec::Gzip.compress(&html).unwrap();
//! assert!(gz.len() < html.len());
//!
//! // Output that would not be smaller than the input is refused
//! assert!(matches!(
//!     Codec::Gzip.compress(b""),
//!     Err(CompressionError::SizeIncrease { .. })
//! ));
//! ```

mod codec;
mod error;

pub use codec::Codec;
pub use error::CompressionError;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, CompressionError>;
