//! precompress - write compressed siblings for the text assets of a built site.
//!
//! ```text
//! precompress public --brotli true --zstd true --overwrite true
//! ```
//!
//! Settings are layered: an optional `--config` file, then `PRECOMPRESS_*`
//! environment variables, then the flags given on the command line.

use clap::Parser;
use precompress_config::{Availability, SettingsSource, resolve};
use precompress_core::Precompressor;
use precompress_log::{Level, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod error;

use error::{CliError, CliResult};

/// Pre-compress the text assets of a generated static site
#[derive(Parser, Debug)]
#[command(name = "precompress")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "Write .gz, .br and .zst siblings next to the text assets of a static site")]
struct Cli {
    /// Output directory of the site build [default: output]
    output_path: Option<PathBuf>,

    /// Settings file (.json, .toml or .env)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable or disable gzip
    #[arg(long, value_name = "BOOL")]
    gzip: Option<bool>,

    /// Enable or disable brotli
    #[arg(long, value_name = "BOOL")]
    brotli: Option<bool>,

    /// Enable or disable zopfli (replaces gzip for .gz files)
    #[arg(long, value_name = "BOOL")]
    zopfli: Option<bool>,

    /// Enable or disable zstd
    #[arg(long, value_name = "BOOL")]
    zstd: Option<bool>,

    /// Replace artifacts left by a previous run
    #[arg(long, value_name = "BOOL")]
    overwrite: Option<bool>,

    /// Skip files smaller than this many bytes
    #[arg(long, value_name = "BYTES")]
    min_size: Option<u64>,

    /// Comma separated extensions to compress, e.g. .html,.css
    #[arg(long, value_name = "LIST", value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Number of worker threads [default: one per CPU]
    #[arg(short, long, value_name = "N")]
    workers: Option<usize>,

    /// Exit with an error if any file failed to compress
    #[arg(long)]
    strict: bool,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        let config = precompress_log::env_config().clone();
        if self.quiet {
            return config.with_level(Level::Error);
        }

        let mut level = config.level;
        for _ in 0..self.verbose {
            level = level.more_verbose();
        }
        config.with_level(level)
    }

    fn settings_source(&self) -> CliResult<SettingsSource> {
        let mut source = SettingsSource::new();

        if let Some(path) = &self.config {
            source.load_file(path)?;
        }
        source.load_env();

        if let Some(path) = &self.output_path {
            source.set("output_path", path)?;
        }
        for (key, value) in [
            ("gzip", self.gzip),
            ("brotli", self.brotli),
            ("zopfli", self.zopfli),
            ("zstd", self.zstd),
            ("overwrite", self.overwrite),
        ] {
            if let Some(enabled) = value {
                source.set(key, enabled)?;
            }
        }
        if let Some(min_size) = self.min_size {
            source.set("min_size", min_size)?;
        }
        if let Some(extensions) = &self.extensions {
            source.set("text_extensions", extensions)?;
        }
        if let Some(workers) = self.workers {
            source.set("workers", workers)?;
        }

        Ok(source)
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    let raw = cli.settings_source()?.raw()?;
    let resolution = resolve(&raw, &Availability::detect())?;

    let report = Precompressor::new(resolution.settings).run();

    if cli.strict && report.summary.has_failures() {
        return Err(CliError::Failed(report.summary.failed));
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    precompress_log::init_with(cli.log_config());

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
