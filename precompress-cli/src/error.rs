//! Error types for the precompress CLI.

use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// Settings could not be loaded or resolved
    Config(precompress_config::ConfigError),

    /// At least one task failed and `--strict` was given
    Failed(usize),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Failed(count) => write!(f, "{} compression task(s) failed", count),
        }
    }
}

impl std::error::Error for CliError {}

impl From<precompress_config::ConfigError> for CliError {
    fn from(e: precompress_config::ConfigError) -> Self {
        CliError::Config(e)
    }
}
