//! Snapshot persistence
//!
//! The whole [`Dataset`] lives in a single JSON document. Every change is
//! written back as a full snapshot; there is no partial update.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::dataset::Dataset;

/// Storage key of the snapshot document, also used as its file stem
pub const STORAGE_KEY: &str = "cost-app-data-v1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Reads and writes the dataset snapshot at a fixed path
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the stored dataset, falling back to the sample dataset
    ///
    /// A missing snapshot is the normal first-run case. An unreadable or
    /// malformed snapshot is reported with a warning and left as it is on
    /// disk; the next [`save`](Self::save) overwrites it.
    pub fn load(&self) -> Dataset {
        match self.try_load() {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no snapshot stored, using sample dataset");
                Dataset::sample()
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to load stored snapshot, using sample dataset"
                );
                Dataset::sample()
            }
        }
    }

    /// Load the stored dataset, `None` when nothing has been stored yet
    pub fn try_load(&self) -> Result<Option<Dataset>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        read_snapshot(&self.path).map(Some)
    }

    /// Overwrite the snapshot with `data`
    ///
    /// Written to a sibling temp file first and renamed into place, so a
    /// failed write never leaves a truncated snapshot behind.
    pub fn save(&self, data: &Dataset) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let json = serde_json::to_string_pretty(data)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(io_error(&tmp))?;
        fs::rename(&tmp, &self.path).map_err(io_error(&self.path))?;

        tracing::debug!(
            path = %self.path.display(),
            products = data.products.len(),
            entries = data.cost_entry_count(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Replace the stored snapshot with the one at `source`
    ///
    /// The file is parsed in full before anything is written, so a bad
    /// import leaves the current snapshot untouched.
    pub fn import(&self, source: &Path) -> Result<Dataset, StoreError> {
        let data = read_snapshot(source)?;
        self.save(&data)?;
        Ok(data)
    }

    /// Write the current dataset to `target`
    pub fn export(&self, target: &Path) -> Result<Dataset, StoreError> {
        let data = self.load();
        let json = serde_json::to_string_pretty(&data)?;
        fs::write(target, json).map_err(io_error(target))?;
        Ok(data)
    }

    /// Store the empty dataset
    pub fn reset(&self) -> Result<Dataset, StoreError> {
        let data = Dataset::empty();
        self.save(&data)?;
        Ok(data)
    }

    /// Store the sample dataset
    pub fn seed(&self) -> Result<Dataset, StoreError> {
        let data = Dataset::sample();
        self.save(&data)?;
        Ok(data)
    }
}

fn read_snapshot(path: &Path) -> Result<Dataset, StoreError> {
    let contents = fs::read_to_string(path).map_err(io_error(path))?;
    serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
