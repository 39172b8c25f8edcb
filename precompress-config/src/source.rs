// Layered settings sources

use crate::env::{EnvLoader, coerce_value};
use crate::loader::{ConfigLoader, normalize_key};
use crate::{ConfigError, RawSettings, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Collects raw settings from files, the environment and explicit overrides.
///
/// Later layers win: load a file first, then the environment, then apply
/// command line overrides with [`SettingsSource::set`].
#[derive(Debug, Clone, Default)]
pub struct SettingsSource {
    values: Map<String, Value>,
}

impl SettingsSource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge settings from a JSON, TOML or `.env` file
    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        let loader = ConfigLoader::auto(path)?;
        if let Value::Object(map) = loader.load_file(path)? {
            self.values.extend(map);
        }
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(())
    }

    /// Merge `PRECOMPRESS_*` variables from the process environment
    pub fn load_env(&mut self) {
        self.merge_env(EnvLoader::default().load());
    }

    /// Merge variables from an explicit environment
    pub fn load_env_from<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.merge_env(EnvLoader::default().load_from(vars));
    }

    fn merge_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in vars {
            let value = coerce_value(&key, &value);
            self.values.insert(key, value);
        }
    }

    /// Set a single value, overriding every earlier layer
    pub fn set<T: serde::Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        let json_value = serde_json::to_value(value)
            .map_err(|e| ConfigError::SerializationError(e.to_string()))?;
        self.values.insert(normalize_key(key), json_value);
        Ok(())
    }

    /// Check if a key has been set by any layer
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(&normalize_key(key))
    }

    /// Deserialize the merged layers.
    ///
    /// Unknown keys (such as `log_level` from the environment) are ignored.
    pub fn raw(&self) -> Result<RawSettings> {
        serde_json::from_value(Value::Object(self.values.clone()))
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }
}
