use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_yaml_ng::Value;

use crate::error::ConfigError;

/// Config file name, looked up in the current directory and then in `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".copenapi";

/// The only section read by the client.
pub const DEFAULT_SECTION: &str = "default";

/// Prefix of keys that become request headers.
pub const HEADER_PREFIX: &str = "header.";

/// Sectioned key/value settings. Values are kept as strings in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl Config {
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: IndexMap<String, Option<IndexMap<String, Value>>> =
            serde_yaml_ng::from_str(input)?;

        let mut sections = IndexMap::with_capacity(raw.len());
        for (section, entries) in raw {
            let mut values = IndexMap::new();
            for (key, value) in entries.unwrap_or_default() {
                let value = scalar_string(value).ok_or_else(|| ConfigError::NonScalar {
                    section: section.clone(),
                    key: key.clone(),
                })?;
                values.insert(key, value);
            }
            sections.insert(section, values);
        }
        Ok(Self { sections })
    }

    /// Load config from a YAML file. Returns `None` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("using config {}", path.display());
        Self::from_yaml(&content).map(Some)
    }

    /// Load the first config found in the current directory or `$HOME`.
    pub fn discover() -> Result<Option<Self>, ConfigError> {
        let mut dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd);
        }
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home));
        }
        Self::discover_in(&dirs)
    }

    /// Load the first `.copenapi` found in `dirs`, in order.
    pub fn discover_in(dirs: &[PathBuf]) -> Result<Option<Self>, ConfigError> {
        for dir in dirs {
            if let Some(config) = Self::load(&dir.join(CONFIG_FILE_NAME))? {
                return Ok(Some(config));
            }
        }
        Ok(None)
    }

    pub fn value(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    pub fn default_value(&self, key: &str) -> Option<&str> {
        self.value(DEFAULT_SECTION, key)
    }

    pub fn default_int(&self, key: &str) -> Option<i64> {
        self.default_value(key)?.trim().parse().ok()
    }

    /// Accepts integers (non-zero is true) and `true`/`false`/`yes`/`no`.
    pub fn default_bool(&self, key: &str) -> Option<bool> {
        if let Some(n) = self.default_int(key) {
            return Some(n != 0);
        }
        match self.default_value(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }

    /// `header.<name>` keys of the default section as `(name, value)`.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .get(DEFAULT_SECTION)
            .into_iter()
            .flatten()
            .filter_map(|(key, value)| {
                key.strip_prefix(HEADER_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name, value.as_str()))
            })
    }
}

fn scalar_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Example file printed when no spec can be located.
pub fn example_config_content() -> &'static str {
    r#"# copenapi configuration, read from ./.copenapi or ~/.copenapi
default:
  apispec: /path/to/swagger.json
  # baseurl: https://localhost:2081/v1
  # insecure: 1
  # header.X-Api-Key: secret
"#
}
