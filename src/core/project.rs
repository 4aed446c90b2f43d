//! Project discovery and structure
//!
//! A costbook project is any directory holding a `.costbook/` folder. The
//! folder contains the project config and the dataset snapshot.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::dataset::Dataset;
use crate::core::store::{SnapshotStore, StoreError, STORAGE_KEY};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".costbook";

/// Represents a costbook project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .costbook/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project at the given path
    ///
    /// The snapshot is seeded with the sample dataset, or left empty when
    /// `empty` is set.
    pub fn init(path: &Path, empty: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }
        Self::create(root, empty)
    }

    /// Re-create the project even if .costbook/ exists
    ///
    /// Config and snapshot are overwritten.
    pub fn init_force(path: &Path, empty: bool) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self::create(root, empty)
    }

    fn create(root: PathBuf, empty: bool) -> Result<Self, ProjectError> {
        let project = Self { root };
        std::fs::create_dir_all(project.costbook_dir())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(project.config_path(), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let store = SnapshotStore::new(project.default_snapshot_path());
        let initial = if empty { Dataset::empty() } else { Dataset::sample() };
        store.save(&initial)?;

        tracing::debug!(root = %project.root.display(), empty, "initialized project");
        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Costbook Project Configuration

# Currency code used for totals and new records (JPY, USD, EUR, ...)
# currency: JPY

# Fraction digits shown for amounts
# precision: 0

# Default output format (auto, tsv, json, yaml, csv, md, id)
# default_format: auto

# Snapshot file, relative to the project root
# data_file: .costbook/cost-app-data-v1.json
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .costbook directory
    pub fn costbook_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.costbook_dir().join("config.yaml")
    }

    /// Snapshot location when no `data_file` is configured
    pub fn default_snapshot_path(&self) -> PathBuf {
        self.costbook_dir().join(format!("{}.json", STORAGE_KEY))
    }

    /// Resolve a configured data file against the project root
    pub fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a costbook project (searched from {searched_from:?}). Run 'costbook init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("costbook project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
