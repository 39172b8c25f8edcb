//! Static asset pre-compression
//!
//! Walks the finished output directory of a site build and writes a
//! compressed sibling (`index.html.gz`, `index.html.br`, ...) next to every
//! text asset, so a web server can serve the encoded variant directly.
//!
//! # Features
//!
//! - **Eligibility** - Allow-list of extensions plus a minimum source size
//! - **Never Bigger** - Artifacts that would not be smaller are not written
//! - **Safe Reruns** - Existing artifacts are kept unless overwriting is enabled
//! - **Parallel** - Tasks run on a rayon worker pool
//!
//! # Example
//!
//! ```rust,no_run
//! use precompress_config::{Availability, RawSettings, resolve};
//! use precompress_core::Precompressor;
//!
//! let raw = RawSettings {
//!     output_path: Some("public".into()),
//!     ..Default::default()
//! };
//! let resolution = resolve(&raw, &Availability::detect()).unwrap();
//!
//! let report = Precompressor::new(resolution.settings).run();
//! assert!(!report.summary.has_failures());
//! ```

pub mod batch;
pub mod dispatch;
pub mod eligibility;
pub mod error;
pub mod outcome;
pub mod task;

pub use batch::{BatchReport, Plan, Precompressor};
pub use dispatch::{Dispatcher, InlineDispatcher, ThreadPoolDispatcher};
pub use eligibility::{CandidateFile, Eligibility, extension_of, is_candidate};
pub use error::{Result, TaskError};
pub use outcome::{BatchSummary, Outcome, TaskReport};
pub use task::{CompressionTask, artifact_path};

pub use precompress_codec::{Codec, CompressionError};
pub use precompress_config::Settings;
