// Settings management for the precompress tool

pub mod env;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod settings;
pub mod source;

pub use env::EnvLoader;
pub use error::{ConfigError, Result};
pub use loader::{ConfigLoader, FileFormat};
pub use resolve::{Diagnostic, Resolution, Severity, resolve};
pub use settings::{
    Availability, DEFAULT_MIN_SIZE, DEFAULT_TEXT_EXTENSIONS, RawSettings, Settings,
    SettingsBuilder,
};
pub use source::SettingsSource;
