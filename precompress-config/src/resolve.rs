//! Settings resolution
//!
//! Turns [`RawSettings`] plus an [`Availability`] map into validated
//! [`Settings`]. Invalid requests never abort a build: the offending codec or
//! extension is dropped, a [`Diagnostic`] is recorded and the same message is
//! logged.

use crate::settings::{DEFAULT_MIN_SIZE, DEFAULT_OUTPUT_PATH, DEFAULT_TEXT_EXTENSIONS};
use crate::{Availability, ConfigError, RawSettings, Result, Settings};
use precompress_codec::Codec;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Severity of a resolution diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A configuration problem that was recovered from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Validated settings plus everything that had to be corrected
#[derive(Debug, Clone)]
pub struct Resolution {
    pub settings: Settings,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Number of error diagnostics
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Number of warning diagnostics
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

#[derive(Default)]
struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    fn error(&mut self, message: String) {
        tracing::error!("{}", message);
        self.0.push(Diagnostic {
            severity: Severity::Error,
            message,
        });
    }

    fn warning(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.0.push(Diagnostic {
            severity: Severity::Warning,
            message,
        });
    }
}

/// Resolve raw settings against the codecs available in this environment.
///
/// Only an output path that cannot be made absolute is an error.
pub fn resolve(raw: &RawSettings, available: &Availability) -> Result<Resolution> {
    let mut diagnostics = Diagnostics::default();

    let codecs = resolve_codecs(raw, available, &mut diagnostics);
    let text_extensions = resolve_extensions(raw.text_extensions.as_ref(), &mut diagnostics);
    let output_path = resolve_output_path(raw.output_path.as_ref())?;

    let workers = match raw.workers {
        Some(0) => {
            diagnostics.warning(
                "Worker count must be at least 1; using one worker per CPU".to_string(),
            );
            None
        }
        other => other,
    };

    let settings = Settings {
        output_path,
        codecs,
        text_extensions,
        overwrite: raw.overwrite.unwrap_or(false),
        min_size: raw.min_size.unwrap_or(DEFAULT_MIN_SIZE),
        workers,
    };

    tracing::debug!(
        output_path = %settings.output_path().display(),
        codecs = ?settings.codecs(),
        overwrite = settings.overwrite(),
        min_size = settings.min_size(),
        "Resolved settings"
    );

    Ok(Resolution {
        settings,
        diagnostics: diagnostics.0,
    })
}

fn resolve_codecs(
    raw: &RawSettings,
    available: &Availability,
    diagnostics: &mut Diagnostics,
) -> BTreeSet<Codec> {
    let mut codecs = BTreeSet::new();

    for codec in [Codec::Brotli, Codec::Zopfli, Codec::Zstd] {
        let is_available = available.is_available(codec);
        let enabled = match raw.requested(codec) {
            Some(true) if !is_available => {
                diagnostics.error(format!(
                    "{} compression was requested but is not available in this build; disabling it",
                    codec
                ));
                false
            }
            Some(requested) => requested,
            None => is_available,
        };
        if enabled {
            codecs.insert(codec);
        }
    }

    // Zopfli produces gzip streams, so by default it replaces plain gzip.
    let gzip = raw.gzip.unwrap_or(!codecs.contains(&Codec::Zopfli));
    if gzip {
        codecs.insert(Codec::Gzip);
        if codecs.contains(&Codec::Zopfli) {
            diagnostics.warning(
                "gzip and zopfli are both enabled; zopfli will write the .gz files".to_string(),
            );
        }
    }

    codecs
}

fn resolve_extensions(
    requested: Option<&BTreeSet<String>>,
    diagnostics: &mut Diagnostics,
) -> BTreeSet<String> {
    let Some(requested) = requested else {
        return DEFAULT_TEXT_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect();
    };

    let mut cleaned = BTreeSet::new();
    let mut rejected = false;

    for ext in requested {
        match invalid_extension_reason(ext) {
            Some(reason) => {
                diagnostics.warning(format!("Ignoring text extension {:?}: {}", ext, reason));
                rejected = true;
            }
            None => {
                cleaned.insert(ext.clone());
            }
        }
    }

    if rejected {
        let list: Vec<&str> = cleaned.iter().map(String::as_str).collect();
        diagnostics.warning(format!(
            "Compressing files with these extensions only: {}",
            if list.is_empty() {
                "(none)".to_string()
            } else {
                list.join(", ")
            }
        ));
    }

    cleaned
}

fn invalid_extension_reason(ext: &str) -> Option<&'static str> {
    if ext.is_empty() || ext == "." {
        Some("the extension is empty")
    } else if !ext.starts_with('.') {
        Some("extensions must start with '.'")
    } else if Codec::ALL.iter().any(|codec| codec.suffix() == ext) {
        Some("files with this extension are compressed artifacts")
    } else {
        None
    }
}

fn resolve_output_path(requested: Option<&PathBuf>) -> Result<PathBuf> {
    let path = requested
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));
    let path = if path.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        path
    };

    std::path::absolute(&path).map_err(|e| ConfigError::InvalidPath {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use precompress_log::{Level, LogCapture};

    fn raw_with_path() -> RawSettings {
        RawSettings {
            output_path: Some(PathBuf::from("")),
            ..Default::default()
        }
    }

    fn extensions(exts: &[&str]) -> BTreeSet<String> {
        exts.iter().map(|ext| ext.to_string()).collect()
    }

    fn check_defaults(availability: Availability, gzip: bool, brotli: bool, zopfli: bool) {
        let resolution = resolve(&raw_with_path(), &availability).unwrap();
        let settings = &resolution.settings;

        assert!(settings.output_path().is_absolute());
        assert_eq!(
            settings.text_extensions(),
            &extensions(DEFAULT_TEXT_EXTENSIONS)
        );
        assert!(!settings.overwrite());
        assert_eq!(settings.is_enabled(Codec::Gzip), gzip);
        assert_eq!(settings.is_enabled(Codec::Brotli), brotli);
        assert_eq!(settings.is_enabled(Codec::Zopfli), zopfli);
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_defaults_nothing_installed() {
        check_defaults(Availability::gzip_only(), true, false, false);
    }

    #[test]
    fn test_defaults_brotli_installed() {
        check_defaults(
            Availability::gzip_only().with(Codec::Brotli, true),
            true,
            true,
            false,
        );
    }

    #[test]
    fn test_defaults_zopfli_installed() {
        check_defaults(
            Availability::gzip_only().with(Codec::Zopfli, true),
            false,
            false,
            true,
        );
    }

    #[test]
    fn test_defaults_brotli_and_zopfli_installed() {
        check_defaults(
            Availability::gzip_only()
                .with(Codec::Brotli, true)
                .with(Codec::Zopfli, true),
            false,
            true,
            true,
        );
    }

    #[test]
    fn test_zstd_defaults_to_availability() {
        let available = Availability::gzip_only().with(Codec::Zstd, true);
        let resolution = resolve(&raw_with_path(), &available).unwrap();
        assert!(resolution.settings.is_enabled(Codec::Zstd));

        let resolution = resolve(&raw_with_path(), &Availability::gzip_only()).unwrap();
        assert!(!resolution.settings.is_enabled(Codec::Zstd));
    }

    #[test]
    fn test_unavailable_codecs_are_disabled() {
        let raw = raw_with_path()
            .request(Codec::Brotli, true)
            .request(Codec::Gzip, true)
            .request(Codec::Zopfli, true);

        let logs = LogCapture::new();
        let resolution = logs.run(|| resolve(&raw, &Availability::gzip_only()).unwrap());
        let settings = &resolution.settings;

        assert_eq!(resolution.error_count(), 2);
        assert_eq!(logs.count(Level::Error), 2);
        assert_eq!(logs.count(Level::Warn), 0);
        assert!(settings.output_path().is_absolute());
        assert!(!settings.overwrite());
        assert!(!settings.is_enabled(Codec::Brotli));
        assert!(!settings.is_enabled(Codec::Zopfli));
        assert!(settings.is_enabled(Codec::Gzip));
    }

    #[test]
    fn test_unavailable_codecs_without_gzip_request() {
        let raw = raw_with_path()
            .request(Codec::Brotli, true)
            .request(Codec::Zopfli, true);

        let resolution = resolve(&raw, &Availability::gzip_only()).unwrap();

        assert_eq!(resolution.error_count(), 2);
        assert_eq!(
            resolution.settings.codecs(),
            &BTreeSet::from([Codec::Gzip])
        );
    }

    #[test]
    fn test_explicit_settings_override_detection() {
        let available = Availability::gzip_only().with(Codec::Brotli, true);
        let raw = raw_with_path()
            .request(Codec::Brotli, false)
            .request(Codec::Gzip, false);

        let resolution = resolve(&raw, &available).unwrap();
        assert!(resolution.settings.codecs().is_empty());
        assert!(resolution.diagnostics.is_empty());
    }

    #[test]
    fn test_gzip_and_zopfli_both_enabled_warns() {
        let available = Availability::gzip_only().with(Codec::Zopfli, true);
        let raw = raw_with_path().request(Codec::Gzip, true);

        let logs = LogCapture::new();
        let resolution = logs.run(|| resolve(&raw, &available).unwrap());
        assert_eq!(resolution.warning_count(), 1);
        assert_eq!(logs.count(Level::Warn), 1);
        assert_eq!(
            resolution.settings.scheduled_codecs(),
            vec![Codec::Zopfli]
        );
    }

    #[test]
    fn test_extension_validation() {
        let cases: [&[&str]; 6] = [
            &[".br"],
            &[".gz"],
            &[".br", ".gz"],
            &["abc"],
            &["abc", "def"],
            &["", ".zst"],
        ];

        for rejected in cases {
            let mut requested = extensions(rejected);
            requested.insert(".txt".to_string());
            let raw = RawSettings {
                text_extensions: Some(requested),
                ..raw_with_path()
            };

            let logs = LogCapture::new();
            let resolution = logs.run(|| resolve(&raw, &Availability::gzip_only()).unwrap());
            assert_eq!(resolution.warning_count(), rejected.len() + 1);
            assert_eq!(resolution.error_count(), 0);
            assert_eq!(logs.count(Level::Warn), rejected.len() + 1);
            assert_eq!(logs.count(Level::Error), 0);
            assert_eq!(
                resolution.settings.text_extensions(),
                &extensions(&[".txt"])
            );
        }
    }

    #[test]
    fn test_valid_extensions_do_not_warn() {
        let raw = RawSettings {
            text_extensions: Some(extensions(&[".html", ".webmanifest"])),
            ..raw_with_path()
        };

        let resolution = resolve(&raw, &Availability::gzip_only()).unwrap();
        assert!(resolution.diagnostics.is_empty());
        assert_eq!(
            resolution.settings.text_extensions(),
            &extensions(&[".html", ".webmanifest"])
        );
    }

    #[test]
    fn test_min_size_and_workers() {
        let raw = RawSettings {
            min_size: Some(100),
            workers: Some(0),
            ..raw_with_path()
        };

        let resolution = resolve(&raw, &Availability::gzip_only()).unwrap();
        assert_eq!(resolution.settings.min_size(), 100);
        assert_eq!(resolution.settings.workers(), None);
        assert_eq!(resolution.warning_count(), 1);
    }

    #[test]
    fn test_default_output_path() {
        let resolution = resolve(&RawSettings::default(), &Availability::gzip_only()).unwrap();
        let path = resolution.settings.output_path();

        assert!(path.is_absolute());
        assert!(path.ends_with(DEFAULT_OUTPUT_PATH));
    }
}
