//! Eligibility filter
//!
//! Decides, independently of any codec, whether a file on disk is a
//! compression candidate. Only the source size is considered; the would-be
//! compressed size is never estimated up front.

use precompress_config::Settings;
use std::path::{Path, PathBuf};

/// Classification of one walked file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Extension is allowed and the file is large enough
    Eligible,
    /// Extension is allowed but the file is below the minimum size
    TooSmall,
    /// Extension is not in the allow-list
    Ignored,
}

/// A file found while walking the output root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
    /// Extension including the leading dot, e.g. `.html`
    pub extension: Option<String>,
}

impl CandidateFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let extension = extension_of(&path);
        Self {
            path,
            size,
            extension,
        }
    }

    /// Classify this file against the settings
    pub fn eligibility(&self, settings: &Settings) -> Eligibility {
        let allowed = self
            .extension
            .as_ref()
            .is_some_and(|ext| settings.text_extensions().contains(ext));

        if !allowed {
            Eligibility::Ignored
        } else if self.size < settings.min_size() {
            Eligibility::TooSmall
        } else {
            Eligibility::Eligible
        }
    }
}

/// Get the extension of `path` with a leading dot.
///
/// Dotfiles such as `.htaccess` have no extension.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
}

/// Check whether a file is a compression candidate
pub fn is_candidate(path: &Path, size: u64, settings: &Settings) -> bool {
    CandidateFile::new(path, size).eligibility(settings) == Eligibility::Eligible
}
