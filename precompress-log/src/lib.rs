//! Precompress Logging
//!
//! Installs a `tracing` subscriber configured from `PRECOMPRESS_*`
//! environment variables. Library crates only emit events through the
//! `tracing` macros; binaries call [`init`] once at startup.
//!
//! # Usage
//!
//! ```rust
//! precompress_log::init();
//! tracing::info!("Pre-compression started");
//! ```
//!
//! # Environment Variables
//!
//! - `PRECOMPRESS_DEBUG=1` - Enable debug logging
//! - `PRECOMPRESS_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `PRECOMPRESS_LOG_FORMAT=pretty|compact|json` - Set output format
//! - `PRECOMPRESS_LOG_COLOR=1|0` - Enable/disable colors
//!
//! `RUST_LOG` still takes precedence over the level when it is set.

use once_cell::sync::Lazy;
use std::env;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level for precompress logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    /// Trace level (most verbose)
    Trace = 0,
    /// Debug level
    Debug = 1,
    /// Info level
    Info = 2,
    /// Warning level
    Warn = 3,
    /// Error level (least verbose)
    Error = 4,
    /// Off (no logging)
    Off = 5,
}

impl Level {
    /// Parse a level name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    /// Get the directive understood by `EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Off => "off",
        }
    }

    /// One step more verbose, saturating at trace.
    pub fn more_verbose(self) -> Self {
        match self {
            Level::Off => Level::Error,
            Level::Error => Level::Warn,
            Level::Warn => Level::Info,
            Level::Info => Level::Debug,
            Level::Debug | Level::Trace => Level::Trace,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_filter().to_uppercase())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Multi-line human readable output
    Pretty,
    /// Compact single-line format (default for a CLI)
    Compact,
    /// JSON format for structured logging
    Json,
}

impl Format {
    /// Parse a format name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Set once a subscriber has been installed.
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration read from the environment (lazy initialized).
static ENV_CONFIG: Lazy<LogConfig> = Lazy::new(LogConfig::from_env);

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level
    pub level: Level,
    /// Output format
    pub format: Format,
    /// Whether colors are enabled
    pub color: bool,
    /// Whether to include the event target (module path)
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            format: Format::Compact,
            color: false,
            target: false,
        }
    }
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let debug = env_flag("PRECOMPRESS_DEBUG").unwrap_or(false);

        let level = env::var("PRECOMPRESS_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("PRECOMPRESS_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Compact);

        let color = env_flag("PRECOMPRESS_LOG_COLOR").unwrap_or_else(color_by_default);

        Self {
            level,
            format,
            color: color && format != Format::Json,
            target: debug,
        }
    }

    /// Override the level.
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn color_by_default() -> bool {
    env::var("NO_COLOR").is_err() && env::var("TERM").is_ok()
}

// ============================================================================
// Public API
// ============================================================================

/// Get the configuration derived from the environment.
pub fn env_config() -> &'static LogConfig {
    &ENV_CONFIG
}

/// Install the global subscriber configured from the environment.
pub fn init() {
    init_with(env_config().clone());
}

/// Install the global subscriber with an explicit configuration.
///
/// Only the first call installs a subscriber; later calls (or a subscriber
/// installed by the host application) are left untouched.
pub fn init_with(config: LogConfig) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.color)
        .with_target(config.target);

    let result = match config.format {
        Format::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(base.pretty())
            .try_init(),
        Format::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(base.compact().without_time())
            .try_init(),
        Format::Json => tracing_subscriber::registry()
            .with(filter)
            .with(base.json())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("A global subscriber was already installed");
    }
}

/// Check whether [`init`] or [`init_with`] already ran.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

// ============================================================================
// Capture
// ============================================================================

/// Collects formatted events in memory.
///
/// [`LogCapture::run`] installs a subscriber for the current thread only, so
/// code under test must log from that thread.
///
/// ```rust
/// use precompress_log::{Level, LogCapture};
///
/// let logs = LogCapture::new();
/// logs.run(|| tracing::warn!("Overwriting existing file index.html.gz"));
/// assert_eq!(logs.count(Level::Warn), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

/// Writer handed out by [`LogCapture`] for each event
#[derive(Debug)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}

impl LogCapture {
    /// Create an empty capture
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with every event on this thread recorded, one line per event.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, f)
    }

    /// Everything recorded so far
    pub fn output(&self) -> String {
        let buffer = self
            .buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Recorded lines at exactly `level`
    pub fn lines(&self, level: Level) -> Vec<String> {
        let tag = level.to_string();
        self.output()
            .lines()
            .filter(|line| line.trim_start().starts_with(&tag))
            .map(str::to_string)
            .collect()
    }

    /// Number of recorded events at exactly `level`
    pub fn count(&self, level: Level) -> usize {
        self.lines(level).len()
    }
}

// ============================================================================
// Tests
// ============================================================================
