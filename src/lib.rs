// precompress - build-time pre-compression for static sites
//
// This library walks the output directory of a site build and writes gzip,
// zopfli, brotli and zstd siblings next to every text asset.

// Re-export the orchestrator and its building blocks
pub use precompress_core::*;

// Re-export member crates
pub use precompress_codec;
pub use precompress_config;
pub use precompress_core;

#[cfg(feature = "log")]
pub use precompress_log;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        BatchReport, BatchSummary, Codec, CompressionTask, Dispatcher, InlineDispatcher, Outcome,
        Precompressor, Settings, ThreadPoolDispatcher,
    };
    pub use precompress_config::{
        Availability, RawSettings, Resolution, SettingsBuilder, SettingsSource, resolve,
    };
}
