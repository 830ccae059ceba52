//! Configuration loading and lookup.
//!
//! Configuration is a flat set of colon-separated keys (`MicrosoftGraph:BaseUrl`).
//! Values come from embedded `appsettings.toml`, an optional user file, an optional
//! explicit file and finally environment variable overrides. Later layers win.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use tracing::debug;

use crate::error::ConfigError;

/// Embedded configuration file content.
const APPSETTINGS_TOML: &str = include_str!("../appsettings.toml");

/// File name of the user and explicit configuration layers.
const SETTINGS_FILE: &str = "appsettings.toml";

/// Prefix for generic environment overrides (`MEDIATRANSCRIBER__Section__Key`).
const ENV_PREFIX: &str = "MEDIATRANSCRIBER__";

/// Well-known environment variables and the keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("GRAPH_BASE_URL", "MicrosoftGraph:BaseUrl"),
    ("GRAPH_SCOPES", "MicrosoftGraph:Scopes"),
    ("API_BASE_URL", "Api:BaseUrl"),
    ("AZURE_CLIENT_ID", "AzureAd:ClientId"),
    ("AZURE_AUTHORITY", "AzureAd:Authority"),
];

/// Read-only key/value lookup.
///
/// Absent keys return `None`; callers decide the fallback.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// Keys compare case-insensitively.
fn normalize_key(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// In-memory configuration source.
#[derive(Debug, Clone, Default)]
pub struct MapConfig {
    values: HashMap<String, String>,
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MapConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut config = Self::new();
        for (key, value) in iter {
            config.set(key.as_ref(), value);
        }
        config
    }
}

impl ConfigSource for MapConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(&normalize_key(key)).cloned()
    }
}

/// Configuration merged from TOML layers and environment overrides.
#[derive(Debug, Clone, Default)]
pub struct LayeredConfig {
    values: MapConfig,
}

impl LayeredConfig {
    /// Load all layers: embedded defaults, user file, `explicit` file, `.env` and environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::embedded()?;

        if let Some(path) = user_settings_path() {
            if path.exists() {
                config = config.with_file(&path)?;
            } else {
                debug!("No user settings at {:?}", path);
            }
        }

        if let Some(path) = explicit {
            config = config.with_file(path)?;
        }

        // .env is optional
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                debug!("Failed to load .env file: {}", e);
            }
        }

        Ok(config.with_env(env::vars()))
    }

    /// Only the embedded defaults.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::default().with_toml("embedded appsettings.toml", APPSETTINGS_TOML)
    }

    /// Merge a TOML file on top of the current values.
    pub fn with_file(self, path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration layer {:?}", path);
        self.with_toml(&path.display().to_string(), &content)
    }

    /// Merge TOML content on top of the current values.
    pub fn with_toml(mut self, layer: &str, content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
            layer: layer.to_string(),
            reason: e.message().to_string(),
        })?;

        flatten_table("", &table, &mut self.values);
        Ok(self)
    }

    /// Apply environment overrides from `vars`.
    ///
    /// Generic `MEDIATRANSCRIBER__Section__Key` variables apply first, then the
    /// well-known variables, so `GRAPH_BASE_URL` beats
    /// `MEDIATRANSCRIBER__MicrosoftGraph__BaseUrl` whatever the environment order.
    pub fn with_env<I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut named = Vec::new();

        for (name, value) in vars {
            if let Some((_, key)) = ENV_OVERRIDES.iter().find(|(var, _)| *var == name) {
                named.push((*key, value));
            } else if let Some(rest) = name.strip_prefix(ENV_PREFIX) {
                if !rest.is_empty() {
                    self.values.set(&rest.replace("__", ":"), value);
                }
            }
        }

        for (key, value) in named {
            self.values.set(key, value);
        }
        self
    }
}

impl ConfigSource for LayeredConfig {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }
}

/// Path of the per-user settings file.
///
/// Returns `~/.config/mediatranscriber/appsettings.toml` on Linux.
pub fn user_settings_path() -> Option<PathBuf> {
    ProjectDirs::from("de", "malvik", "mediatranscriber")
        .map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut MapConfig) {
    for (name, value) in table {
        let key = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{}:{}", prefix, name)
        };

        match value {
            toml::Value::Table(inner) => flatten_table(&key, inner, out),
            other => out.set(&key, scalar_to_string(other)),
        }
    }
}

fn scalar_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        // Arrays read like a space-separated list, so `Scopes = ["a", "b"]` equals "a b"
        toml::Value::Array(items) => items
            .iter()
            .map(scalar_to_string)
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}
