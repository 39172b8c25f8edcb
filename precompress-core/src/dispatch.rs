//! Task dispatch
//!
//! The orchestrator hands the full task list to a [`Dispatcher`] and gets one
//! report per task back once every task has finished. Tasks touch disjoint
//! (source, artifact) pairs and only read the shared settings, so they can
//! run in any order on any thread.

use crate::outcome::TaskReport;
use crate::task::CompressionTask;
use precompress_config::Settings;
use rayon::prelude::*;

/// Runs a batch of independent compression tasks to completion
pub trait Dispatcher: Send + Sync {
    /// Run every task and return one report per task.
    ///
    /// Returns only after all tasks completed. Report order is unspecified.
    fn dispatch(&self, tasks: Vec<CompressionTask>, settings: &Settings) -> Vec<TaskReport>;
}

/// Runs tasks one after another on the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDispatcher;

impl Dispatcher for InlineDispatcher {
    fn dispatch(&self, tasks: Vec<CompressionTask>, settings: &Settings) -> Vec<TaskReport> {
        tasks.iter().map(|task| task.run(settings)).collect()
    }
}

/// Runs tasks on a fixed-size pool of OS threads.
///
/// The pool is built per dispatch, so a run with nothing to do never starts
/// any threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPoolDispatcher {
    workers: Option<usize>,
}

impl ThreadPoolDispatcher {
    /// Create a dispatcher; `None` sizes the pool to the number of CPUs
    pub fn new(workers: Option<usize>) -> Self {
        Self { workers }
    }

    /// Configured pool size, if any
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    fn build_pool(&self) -> Result<rayon::ThreadPool, rayon::ThreadPoolBuildError> {
        rayon::ThreadPoolBuilder::new()
            // zero lets rayon pick the CPU count
            .num_threads(self.workers.unwrap_or(0))
            .thread_name(|index| format!("precompress-{}", index))
            .build()
    }
}

impl Dispatcher for ThreadPoolDispatcher {
    fn dispatch(&self, tasks: Vec<CompressionTask>, settings: &Settings) -> Vec<TaskReport> {
        let pool = match self.build_pool() {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!("Unable to start worker pool ({}); compressing on one thread", e);
                return InlineDispatcher.dispatch(tasks, settings);
            }
        };

        tracing::debug!(
            threads = pool.current_num_threads(),
            tasks = tasks.len(),
            "Dispatching compression tasks"
        );

        pool.install(|| tasks.par_iter().map(|task| task.run(settings)).collect())
    }
}
