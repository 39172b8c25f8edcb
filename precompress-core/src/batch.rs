//! Batch orchestrator
//!
//! Walks the output root, turns every eligible file into one task per
//! scheduled codec and hands the list to a [`Dispatcher`]. Individual
//! failures are logged and counted; they never abort the batch.

use crate::dispatch::{Dispatcher, ThreadPoolDispatcher};
use crate::eligibility::{CandidateFile, Eligibility};
use crate::outcome::{BatchSummary, Outcome, TaskReport};
use crate::task::CompressionTask;
use precompress_config::Settings;
use walkdir::WalkDir;

/// Tasks to run, plus what was already decided while walking
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub tasks: Vec<CompressionTask>,
    /// Counts for files that never became tasks (too small, unreadable)
    pub summary: BatchSummary,
}

/// Result of a full run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub summary: BatchSummary,
    pub reports: Vec<TaskReport>,
}

/// Pre-compresses every eligible file under the output root
///
/// # Example
///
/// ```rust,no_run
/// use precompress_config::Settings;
/// use precompress_core::Precompressor;
///
/// let settings = Settings::builder("/srv/site/output").build();
/// let report = Precompressor::new(settings).run();
/// println!("{}", report.summary);
/// ```
pub struct Precompressor<D = ThreadPoolDispatcher> {
    settings: Settings,
    dispatcher: D,
}

impl Precompressor<ThreadPoolDispatcher> {
    /// Create an orchestrator that runs on a thread pool sized from the settings
    pub fn new(settings: Settings) -> Self {
        let dispatcher = ThreadPoolDispatcher::new(settings.workers());
        Self {
            settings,
            dispatcher,
        }
    }
}

impl<D: Dispatcher> Precompressor<D> {
    /// Replace the dispatcher
    pub fn with_dispatcher<E: Dispatcher>(self, dispatcher: E) -> Precompressor<E> {
        Precompressor {
            settings: self.settings,
            dispatcher,
        }
    }

    /// Get a reference to the settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Walk the output root and build the task list
    pub fn plan(&self) -> Plan {
        let mut plan = Plan::default();
        let codecs = self.settings.scheduled_codecs();
        if codecs.is_empty() {
            return plan;
        }

        let walker = WalkDir::new(self.settings.output_path())
            .follow_links(false)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::error!("Unable to read directory entry: {}", e);
                    plan.summary.record(&Outcome::Failed(e.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(e) => {
                    tracing::error!("Unable to read metadata of {}: {}", entry.path().display(), e);
                    plan.summary.record(&Outcome::Failed(e.to_string()));
                    continue;
                }
            };

            let candidate = CandidateFile::new(entry.path(), size);
            match candidate.eligibility(&self.settings) {
                Eligibility::Eligible => plan.tasks.extend(
                    codecs
                        .iter()
                        .map(|codec| CompressionTask::new(entry.path(), *codec)),
                ),
                Eligibility::TooSmall => {
                    tracing::debug!(path = %entry.path().display(), size, "File is too small to compress");
                    plan.summary.record(&Outcome::SkippedTooSmall);
                }
                Eligibility::Ignored => {}
            }
        }

        plan
    }

    /// Run the whole batch and log one summary line
    pub fn run(&self) -> BatchReport {
        if self.settings.scheduled_codecs().is_empty() {
            tracing::info!("Pre-compression skipped: no codecs are enabled");
            return BatchReport::default();
        }

        let Plan { tasks, mut summary } = self.plan();

        // Without tasks the dispatcher (and its pool) is never started.
        let reports = if tasks.is_empty() {
            Vec::new()
        } else {
            self.dispatcher.dispatch(tasks, &self.settings)
        };

        for report in &reports {
            summary.record(&report.outcome);
        }

        tracing::info!(
            root = %self.settings.output_path().display(),
            "Pre-compression finished: {}",
            summary
        );

        BatchReport { summary, reports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::InlineDispatcher;
    use precompress_codec::Codec;
    use precompress_log::{Level, LogCapture};
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts dispatch calls and runs tasks inline
    #[derive(Default)]
    struct CountingDispatcher {
        calls: AtomicUsize,
    }

    impl Dispatcher for &CountingDispatcher {
        fn dispatch(&self, tasks: Vec<CompressionTask>, settings: &Settings) -> Vec<TaskReport> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            InlineDispatcher.dispatch(tasks, settings)
        }
    }

    fn write(root: &Path, name: &str, content: &[u8]) {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_plan_one_task_per_file_and_codec() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", &b"a".repeat(100));
        write(dir.path(), "css/site.css", &b"b".repeat(100));
        write(dir.path(), "logo.png", &b"c".repeat(100));

        let settings = Settings::builder(dir.path())
            .codecs([Codec::Gzip, Codec::Brotli])
            .build();
        let plan = Precompressor::new(settings).plan();

        assert_eq!(plan.tasks.len(), 4);
        assert!(
            plan.tasks
                .iter()
                .all(|task| task.source.extension().is_some_and(|ext| ext != "png"))
        );
    }

    #[test]
    fn test_plan_counts_small_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "000-too-small.txt", b"a");
        write(dir.path(), "999-must-compress.txt", &b"a".repeat(100));

        let settings = Settings::builder(dir.path()).min_size(100).build();
        let plan = Precompressor::new(settings).plan();

        assert_eq!(plan.tasks.len(), 1);
        assert!(plan.tasks[0].source.ends_with("999-must-compress.txt"));
        assert_eq!(plan.summary.skipped_too_small, 1);
    }

    #[test]
    fn test_plan_skips_existing_artifacts_as_sources() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", &b"a".repeat(100));
        write(dir.path(), "index.html.gz", &b"a".repeat(100));
        write(dir.path(), "index.html.br", &b"a".repeat(100));

        let settings = Settings::builder(dir.path()).build();
        let plan = Precompressor::new(settings).plan();

        assert_eq!(plan.tasks.len(), 1);
    }

    #[test]
    fn test_no_codecs_never_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "test.txt", &b"a".repeat(100));

        let counter = CountingDispatcher::default();
        let settings = Settings::builder(dir.path()).codecs([]).build();
        let report = Precompressor::new(settings)
            .with_dispatcher(&counter)
            .run();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.summary, BatchSummary::default());
        assert!(!dir.path().join("test.txt.gz").exists());
        assert!(!dir.path().join("test.txt.br").exists());
    }

    #[test]
    fn test_no_eligible_files_never_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "photo.jpg", &b"a".repeat(100));
        write(dir.path(), "tiny.txt", b"a");

        let counter = CountingDispatcher::default();
        let settings = Settings::builder(dir.path()).build();
        let report = Precompressor::new(settings)
            .with_dispatcher(&counter)
            .run();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.summary.skipped_too_small, 1);
        assert!(report.reports.is_empty());
    }

    #[test]
    fn test_run_dispatches_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", &b"a".repeat(100));
        write(dir.path(), "b.txt", &b"b".repeat(100));

        let counter = CountingDispatcher::default();
        let settings = Settings::builder(dir.path()).build();
        let report = Precompressor::new(settings)
            .with_dispatcher(&counter)
            .run();

        assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.summary.written, 2);
        assert!(dir.path().join("a.txt.gz").exists());
        assert!(dir.path().join("b.txt.gz").exists());
    }

    #[test]
    fn test_run_logs_one_summary_line() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", &b"a".repeat(100));
        write(dir.path(), "b.txt", b"b");
        write(dir.path(), "c.txt.gz", b"stale");
        write(dir.path(), "c.txt", &b"c".repeat(100));

        let settings = Settings::builder(dir.path()).build();
        let logs = LogCapture::new();
        let report = logs.run(|| {
            Precompressor::new(settings)
                .with_dispatcher(InlineDispatcher)
                .run()
        });

        assert_eq!(report.summary.written, 1);
        assert_eq!(report.summary.skipped_existing, 1);
        assert_eq!(logs.count(Level::Info), 1);
        assert!(logs.lines(Level::Info)[0].contains("Pre-compression finished: 1 written"));
        assert_eq!(logs.count(Level::Warn), 0);
    }

    #[test]
    fn test_disabled_run_logs_one_line() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", &b"a".repeat(100));

        let settings = Settings::builder(dir.path()).codecs([]).build();
        let logs = LogCapture::new();
        logs.run(|| Precompressor::new(settings).run());

        assert_eq!(logs.count(Level::Info), 1);
    }

    #[test]
    fn test_missing_root_is_counted_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::builder(dir.path().join("missing")).build();

        let report = Precompressor::new(settings)
            .with_dispatcher(InlineDispatcher)
            .run();

        assert_eq!(report.summary.failed, 1);
        assert!(report.reports.is_empty());
    }
}
