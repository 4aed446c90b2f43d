//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::entity::DEFAULT_CURRENCY;
use crate::core::Project;

/// Costbook configuration with layered hierarchy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Currency code for totals and new records
    pub currency: Option<String>,

    /// Fraction digits shown for amounts
    pub precision: Option<usize>,

    /// Default output format
    pub default_format: Option<String>,

    /// Snapshot file, relative to the project root
    pub data_file: Option<String>,
}

/// Valid configuration keys with their descriptions
pub const CONFIG_KEYS: &[(&str, &str)] = &[
    ("currency", "Currency code for totals and new records (JPY, USD, ...)"),
    ("precision", "Fraction digits shown for amounts"),
    (
        "default_format",
        "Default output format (auto, tsv, json, yaml, csv, md, id)",
    ),
    ("data_file", "Snapshot file, relative to the project root"),
];

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/costbook/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.costbook/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(currency) = std::env::var("COSTBOOK_CURRENCY") {
            if !currency.trim().is_empty() {
                config.currency = Some(currency);
            }
        }
        if let Ok(data) = std::env::var("COSTBOOK_DATA") {
            if !data.trim().is_empty() {
                config.data_file = Some(data);
            }
        }

        config
    }

    /// Read one config layer; unreadable or invalid files are skipped with a warning
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };
        if contents.trim().is_empty() {
            return None;
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "costbook")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.currency.is_some() {
            self.currency = other.currency;
        }
        if other.precision.is_some() {
            self.precision = other.precision;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.data_file.is_some() {
            self.data_file = other.data_file;
        }
    }

    /// Currency code, upper-cased, defaulting to JPY
    pub fn currency(&self) -> String {
        self.currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
    }

    pub fn precision(&self) -> usize {
        self.precision.unwrap_or(0).min(6)
    }

    /// Snapshot path for `project`
    pub fn snapshot_path(&self, project: &Project) -> PathBuf {
        match self.data_file.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => project.resolve(path),
            None => project.default_snapshot_path(),
        }
    }

    /// Value of a key as shown by `config show`
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "currency" => self.currency.clone(),
            "precision" => self.precision.map(|p| p.to_string()),
            "default_format" => self.default_format.clone(),
            "data_file" => self.data_file.clone(),
            _ => None,
        }
    }

    pub fn is_valid_key(key: &str) -> bool {
        CONFIG_KEYS.iter().any(|(k, _)| *k == key)
    }
}
