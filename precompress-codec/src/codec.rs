//! Codec implementations

use crate::{CompressionError, Result};
use std::io::Write;

/// Supported pre-compression codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Codec {
    /// Gzip via deflate at maximum level (always available)
    Gzip,

    /// Brotli at maximum quality
    Brotli,

    /// Zopfli, a slower gzip-compatible encoder with smaller output
    Zopfli,

    /// Zstandard at maximum level
    Zstd,
}

impl Codec {
    /// Every codec, in scheduling order.
    pub const ALL: [Codec; 4] = [Codec::Gzip, Codec::Brotli, Codec::Zopfli, Codec::Zstd];

    /// Get the codec name as used in settings
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Brotli => "brotli",
            Self::Zopfli => "zopfli",
            Self::Zstd => "zstd",
        }
    }

    /// Get the suffix appended to the source path to form the artifact path
    ///
    /// Zopfli writes gzip streams, so it shares `.gz` with [`Codec::Gzip`].
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Gzip | Self::Zopfli => ".gz",
            Self::Brotli => ".br",
            Self::Zstd => ".zst",
        }
    }

    /// Check if this codec was compiled into the build (feature enabled)
    pub fn is_available(&self) -> bool {
        match self {
            Self::Gzip => true,
            Self::Brotli => cfg!(feature = "brotli"),
            Self::Zopfli => cfg!(feature = "zopfli"),
            Self::Zstd => cfg!(feature = "zstd"),
        }
    }

    /// Compress `data` with the strongest one-shot setting of this codec.
    ///
    /// Fails with [`CompressionError::SizeIncrease`] instead of returning
    /// output that is not strictly smaller than the input.
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let compressed = match self {
            Self::Gzip => compress_gzip(data)?,
            Self::Brotli => compress_brotli(data)?,
            Self::Zopfli => compress_zopfli(data)?,
            Self::Zstd => compress_zstd(data)?,
        };

        tracing::trace!(
            codec = self.name(),
            original = data.len(),
            compressed = compressed.len(),
            "compressed buffer"
        );

        if compressed.len() >= data.len() {
            return Err(CompressionError::SizeIncrease {
                original: data.len(),
                compressed: compressed.len(),
            });
        }

        Ok(compressed)
    }
}

impl std::fmt::Display for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ========== Gzip Implementation ==========

fn compress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))
}

// ========== Brotli Implementation ==========

#[cfg(feature = "brotli")]
fn compress_brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let params = brotli::enc::BrotliEncoderParams {
        quality: 11,
        lgwin: 22,
        ..Default::default()
    };

    let mut reader = std::io::Cursor::new(data);
    brotli::BrotliCompress(&mut reader, &mut output, &params)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    Ok(output)
}

#[cfg(not(feature = "brotli"))]
fn compress_brotli(_data: &[u8]) -> Result<Vec<u8>> {
    Err(CompressionError::Unavailable(Codec::Brotli))
}

// ========== Zopfli Implementation ==========

#[cfg(feature = "zopfli")]
fn compress_zopfli(data: &[u8]) -> Result<Vec<u8>> {
    // Default options run 15 full iterations per block, the same search depth
    // as the reference zopfli gzip tool.
    let options = zopfli::Options::default();
    let mut output = Vec::new();
    zopfli::compress(options, zopfli::Format::Gzip, data, &mut output)
        .map_err(|e| CompressionError::CompressionFailed(e.to_string()))?;

    Ok(output)
}

#[cfg(not(feature = "zopfli"))]
fn compress_zopfli(_data: &[u8]) -> Result<Vec<u8>> {
    Err(CompressionError::Unavailable(Codec::Zopfli))
}

// ========== Zstd Implementation ==========

#[cfg(feature = "zstd")]
fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    let level = *zstd::compression_level_range().end();
    zstd::bulk::compress(data, level).map_err(|e| CompressionError::CompressionFailed(e.to_string()))
}

#[cfg(not(feature = "zstd"))]
fn compress_zstd(_data: &[u8]) -> Result<Vec<u8>> {
    Err(CompressionError::Unavailable(Codec::Zstd))
}
