//! Raw and resolved settings

use precompress_codec::Codec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Extensions compressed when the user does not configure any.
pub const DEFAULT_TEXT_EXTENSIONS: &[&str] = &[
    ".atom", ".css", ".htm", ".html", ".ini", ".js", ".json", ".py", ".rss", ".svg", ".txt",
    ".xml", ".xsl",
];

/// Files smaller than this are never compressed. A gzip stream alone carries
/// 18 bytes of header and trailer.
pub const DEFAULT_MIN_SIZE: u64 = 20;

/// Default output directory of the site generator.
pub const DEFAULT_OUTPUT_PATH: &str = "output";

/// Settings as requested by the user, before validation.
///
/// Every field is optional; `None` means "use the default", which for the
/// optional codecs depends on what is available in this build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSettings {
    pub output_path: Option<PathBuf>,
    pub gzip: Option<bool>,
    pub brotli: Option<bool>,
    pub zopfli: Option<bool>,
    pub zstd: Option<bool>,
    pub text_extensions: Option<BTreeSet<String>>,
    pub overwrite: Option<bool>,
    pub min_size: Option<u64>,
    pub workers: Option<usize>,
}

impl RawSettings {
    /// Get the explicit request for a codec, if any
    pub fn requested(&self, codec: Codec) -> Option<bool> {
        match codec {
            Codec::Gzip => self.gzip,
            Codec::Brotli => self.brotli,
            Codec::Zopfli => self.zopfli,
            Codec::Zstd => self.zstd,
        }
    }

    /// Set the explicit request for a codec
    pub fn request(mut self, codec: Codec, enabled: bool) -> Self {
        let slot = match codec {
            Codec::Gzip => &mut self.gzip,
            Codec::Brotli => &mut self.brotli,
            Codec::Zopfli => &mut self.zopfli,
            Codec::Zstd => &mut self.zstd,
        };
        *slot = Some(enabled);
        self
    }
}

/// Which codecs can actually run in this environment.
///
/// Injected into the resolver so resolution stays a pure function of its
/// inputs. Gzip is always available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Availability {
    brotli: bool,
    zopfli: bool,
    zstd: bool,
}

impl Availability {
    /// Availability of the codecs compiled into this build
    pub fn detect() -> Self {
        Self {
            brotli: Codec::Brotli.is_available(),
            zopfli: Codec::Zopfli.is_available(),
            zstd: Codec::Zstd.is_available(),
        }
    }

    /// Only gzip is available
    pub fn gzip_only() -> Self {
        Self {
            brotli: false,
            zopfli: false,
            zstd: false,
        }
    }

    /// Mark a codec as available or not
    pub fn with(mut self, codec: Codec, available: bool) -> Self {
        match codec {
            Codec::Gzip => {}
            Codec::Brotli => self.brotli = available,
            Codec::Zopfli => self.zopfli = available,
            Codec::Zstd => self.zstd = available,
        }
        self
    }

    /// Check if a codec is available
    pub fn is_available(&self, codec: Codec) -> bool {
        match codec {
            Codec::Gzip => true,
            Codec::Brotli => self.brotli,
            Codec::Zopfli => self.zopfli,
            Codec::Zstd => self.zstd,
        }
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::detect()
    }
}

/// Validated settings for one run. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub(crate) output_path: PathBuf,
    pub(crate) codecs: BTreeSet<Codec>,
    pub(crate) text_extensions: BTreeSet<String>,
    pub(crate) overwrite: bool,
    pub(crate) min_size: u64,
    pub(crate) workers: Option<usize>,
}

impl Settings {
    /// Create a builder for settings rooted at `output_path`.
    ///
    /// The builder trusts its input; use [`crate::resolve`] to validate
    /// user-supplied values.
    pub fn builder(output_path: impl Into<PathBuf>) -> SettingsBuilder {
        SettingsBuilder::new(output_path)
    }

    /// Absolute path of the output root
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Enabled codecs
    pub fn codecs(&self) -> &BTreeSet<Codec> {
        &self.codecs
    }

    /// Check if a codec is enabled
    pub fn is_enabled(&self, codec: Codec) -> bool {
        self.codecs.contains(&codec)
    }

    /// Codecs that get a task per eligible file.
    ///
    /// Gzip and zopfli write the same `.gz` artifact, so when both are
    /// enabled only zopfli is scheduled.
    pub fn scheduled_codecs(&self) -> Vec<Codec> {
        self.codecs
            .iter()
            .copied()
            .filter(|codec| !(*codec == Codec::Gzip && self.is_enabled(Codec::Zopfli)))
            .collect()
    }

    /// Eligible file extensions, each starting with `.`
    pub fn text_extensions(&self) -> &BTreeSet<String> {
        &self.text_extensions
    }

    /// Whether existing artifacts are overwritten
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Minimum source size in bytes
    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    /// Requested worker-pool size, `None` for one worker per CPU
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }
}

/// Builder for [`Settings`]
#[derive(Debug, Clone)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    /// Create a builder with gzip enabled and default extensions
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            settings: Settings {
                output_path: output_path.into(),
                codecs: BTreeSet::from([Codec::Gzip]),
                text_extensions: DEFAULT_TEXT_EXTENSIONS
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
                overwrite: false,
                min_size: DEFAULT_MIN_SIZE,
                workers: None,
            },
        }
    }

    /// Replace the enabled codecs
    pub fn codecs(mut self, codecs: impl IntoIterator<Item = Codec>) -> Self {
        self.settings.codecs = codecs.into_iter().collect();
        self
    }

    /// Enable or disable a single codec
    pub fn codec(mut self, codec: Codec, enabled: bool) -> Self {
        if enabled {
            self.settings.codecs.insert(codec);
        } else {
            self.settings.codecs.remove(&codec);
        }
        self
    }

    /// Replace the eligible extensions
    pub fn text_extensions<S: Into<String>>(mut self, exts: impl IntoIterator<Item = S>) -> Self {
        self.settings.text_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Set whether existing artifacts are overwritten
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.settings.overwrite = overwrite;
        self
    }

    /// Set the minimum source size
    pub fn min_size(mut self, min_size: u64) -> Self {
        self.settings.min_size = min_size;
        self
    }

    /// Set the worker-pool size
    pub fn workers(mut self, workers: Option<usize>) -> Self {
        self.settings.workers = workers;
        self
    }

    /// Build the settings
    pub fn build(self) -> Settings {
        self.settings
    }
}
