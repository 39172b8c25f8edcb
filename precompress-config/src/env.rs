// Environment variable loading

use serde_json::Value;
use std::collections::HashMap;
use std::env;
use std::ffi::OsString;

/// Prefix of every settings variable, e.g. `PRECOMPRESS_OVERWRITE`.
pub const ENV_PREFIX: &str = "PRECOMPRESS";

/// Environment variable loader
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.load_from_os(env::vars_os())
    }

    /// Load matching variables from raw OS strings.
    ///
    /// Unrelated variables are skipped whatever their encoding. A matching
    /// variable whose value is not valid UTF-8 is skipped with a warning.
    pub fn load_from_os<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let utf8 = vars.into_iter().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            if !self.matches(&key) {
                return None;
            }
            match value.into_string() {
                Ok(value) => Some((key, value)),
                Err(_) => {
                    tracing::warn!("Ignoring {}: value is not valid UTF-8", key);
                    None
                }
            }
        });

        self.load_from(utf8)
    }

    fn matches(&self, key: &str) -> bool {
        self.prefix
            .as_deref()
            .is_none_or(|prefix| key.starts_with(prefix))
    }

    /// Load all matching variables from an explicit set of pairs.
    ///
    /// Keys are lowercased and have the prefix (and its `_` separator)
    /// stripped, so `PRECOMPRESS_MIN_SIZE` becomes `min_size`.
    pub fn load_from<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = HashMap::new();

        for (key, value) in vars {
            if let Some(ref prefix) = self.prefix {
                if let Some(trimmed_key) = key.strip_prefix(prefix.as_str()) {
                    let trimmed_key = trimmed_key.trim_start_matches('_');
                    if !trimmed_key.is_empty() {
                        config.insert(trimmed_key.to_lowercase(), value);
                    }
                }
            } else {
                config.insert(key.to_lowercase(), value);
            }
        }

        config
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(ENV_PREFIX.to_string()))
    }
}

/// Turn a textual setting into a typed JSON value.
///
/// `text_extensions` is a comma separated list; everything else is parsed as
/// a JSON scalar (`true`, `42`) and falls back to a plain string.
pub fn coerce_value(key: &str, value: &str) -> Value {
    let value = value.trim();

    if key == "text_extensions" {
        return Value::Array(
            value
                .split(',')
                .map(|ext| Value::String(ext.trim().to_string()))
                .collect(),
        );
    }

    match value.to_lowercase().as_str() {
        "yes" | "on" => return Value::Bool(true),
        "no" | "off" => return Value::Bool(false),
        _ => {}
    }

    match serde_json::from_str::<Value>(value) {
        Ok(parsed @ (Value::Bool(_) | Value::Number(_))) => parsed,
        _ => Value::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_loader_reads_process_environment() {
        // Must not panic whatever else the environment holds
        let loaded = EnvLoader::default().load();
        assert!(loaded.keys().all(|key| key == &key.to_lowercase()));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_loader_skips_non_utf8_values() {
        use precompress_log::{Level, LogCapture};
        use std::os::unix::ffi::OsStringExt;

        let junk = || OsString::from_vec(vec![0xff, 0xfe]);
        let vars = vec![
            (OsString::from("JUNK"), junk()),
            (OsString::from_vec(vec![0xff]), OsString::from("x")),
            (OsString::from("PRECOMPRESS_OUTPUT_PATH"), junk()),
            (OsString::from("PRECOMPRESS_GZIP"), OsString::from("false")),
        ];

        let logs = LogCapture::new();
        let loaded = logs.run(|| EnvLoader::default().load_from_os(vars));

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.get("gzip").map(String::as_str), Some("false"));
        assert_eq!(logs.count(Level::Warn), 1);
        assert!(logs.lines(Level::Warn)[0].contains("PRECOMPRESS_OUTPUT_PATH"));
    }

    #[test]
    fn test_env_loader_prefix_stripping() {
        let loader = EnvLoader::default();
        let loaded = loader.load_from(vars(&[
            ("PRECOMPRESS_GZIP", "false"),
            ("PRECOMPRESS_MIN_SIZE", "100"),
            ("PRECOMPRESS", "ignored"),
            ("HOME", "/root"),
        ]));

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("gzip").map(String::as_str), Some("false"));
        assert_eq!(loaded.get("min_size").map(String::as_str), Some("100"));
    }

    #[test]
    fn test_env_loader_without_prefix() {
        let loader = EnvLoader::new(None);
        let loaded = loader.load_from(vars(&[("HOME", "/root")]));
        assert_eq!(loaded.get("home").map(String::as_str), Some("/root"));
    }

    #[test]
    fn test_coerce_scalars() {
        assert_eq!(coerce_value("gzip", "true"), Value::Bool(true));
        assert_eq!(coerce_value("gzip", "off"), Value::Bool(false));
        assert_eq!(coerce_value("min_size", " 42 "), serde_json::json!(42));
        assert_eq!(
            coerce_value("output_path", "public"),
            Value::String("public".to_string())
        );
    }

    #[test]
    fn test_coerce_extension_list() {
        assert_eq!(
            coerce_value("text_extensions", ".html, .css,.js"),
            serde_json::json!([".html", ".css", ".js"])
        );
    }
}
