//! Task outcomes and batch aggregation

use precompress_codec::Codec;
use std::path::PathBuf;

/// What a single (file, codec) task did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The artifact was written; `replaced` if an older artifact was overwritten
    Written { replaced: bool },
    /// An artifact already existed and overwriting is disabled
    SkippedExists,
    /// The source is below the minimum size
    SkippedTooSmall,
    /// Compression did not shrink the source; `erased` if a stale artifact was removed
    SkippedSizeIncrease { erased: bool },
    /// An I/O or codec error, isolated to this task
    Failed(String),
}

impl Outcome {
    /// Short label used in log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Written { replaced: false } => "written",
            Self::Written { replaced: true } => "replaced",
            Self::SkippedExists => "skipped-exists",
            Self::SkippedTooSmall => "skipped-too-small",
            Self::SkippedSizeIncrease { erased: false } => "skipped-size-increase",
            Self::SkippedSizeIncrease { erased: true } => "erased-stale-artifact",
            Self::Failed(_) => "failed",
        }
    }
}

/// Outcome of one task together with what it worked on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub source: PathBuf,
    pub codec: Codec,
    pub outcome: Outcome,
}

/// Counts of outcomes across a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub written: usize,
    /// Subset of `written` that replaced an existing artifact
    pub replaced: usize,
    pub skipped_existing: usize,
    pub skipped_too_small: usize,
    pub skipped_size_increase: usize,
    /// Subset of `skipped_size_increase` that removed a stale artifact
    pub erased: usize,
    pub failed: usize,
}

impl BatchSummary {
    /// Add one outcome to the counts
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written { replaced } => {
                self.written += 1;
                if *replaced {
                    self.replaced += 1;
                }
            }
            Outcome::SkippedExists => self.skipped_existing += 1,
            Outcome::SkippedTooSmall => self.skipped_too_small += 1,
            Outcome::SkippedSizeIncrease { erased } => {
                self.skipped_size_increase += 1;
                if *erased {
                    self.erased += 1;
                }
            }
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    /// Number of writes and removals performed
    pub fn disk_changes(&self) -> usize {
        self.written + self.erased
    }

    /// Whether any task or directory entry failed
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} written ({} replaced), {} already present, {} too small, {} not smaller ({} erased), {} failed",
            self.written,
            self.replaced,
            self.skipped_existing,
            self.skipped_too_small,
            self.skipped_size_increase,
            self.erased,
            self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = BatchSummary::default();
        for outcome in [
            Outcome::Written { replaced: false },
            Outcome::Written { replaced: true },
            Outcome::SkippedExists,
            Outcome::SkippedTooSmall,
            Outcome::SkippedSizeIncrease { erased: true },
            Outcome::SkippedSizeIncrease { erased: false },
            Outcome::Failed("boom".to_string()),
        ] {
            summary.record(&outcome);
        }

        assert_eq!(summary.written, 2);
        assert_eq!(summary.replaced, 1);
        assert_eq!(summary.skipped_existing, 1);
        assert_eq!(summary.skipped_too_small, 1);
        assert_eq!(summary.skipped_size_increase, 2);
        assert_eq!(summary.erased, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.disk_changes(), 3);
        assert!(summary.has_failures());
    }

    #[test]
    fn test_summary_display() {
        let summary = BatchSummary {
            written: 3,
            skipped_existing: 1,
            ..Default::default()
        };
        assert_eq!(
            summary.to_string(),
            "3 written (0 replaced), 1 already present, 0 too small, 0 not smaller (0 erased), 0 failed"
        );
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(Outcome::Written { replaced: true }.label(), "replaced");
        assert_eq!(
            Outcome::SkippedSizeIncrease { erased: true }.label(),
            "erased-stale-artifact"
        );
        assert_eq!(Outcome::Failed("boom".to_string()).label(), "failed");
    }
}
