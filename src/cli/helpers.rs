//! Shared helper functions for CLI commands
//!
//! [`Workspace`] bundles what nearly every command needs: the project, its
//! merged configuration and the snapshot store.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::identity::RecordId;
use crate::core::money::format_amount;
use crate::core::{Config, Dataset, Project, SnapshotStore};

/// An opened project with its configuration and snapshot store
#[derive(Debug)]
pub struct Workspace {
    pub project: Project,
    pub config: Config,
    pub store: SnapshotStore,
}

impl Workspace {
    /// Find the project (from `--project` or the current directory) and load its config
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let project = match &global.project {
            Some(path) => Project::discover_from(path),
            None => Project::discover(),
        }
        .map_err(|e| miette::miette!("{}", e))?;

        let config = Config::load_for(Some(&project));
        let store = SnapshotStore::new(config.snapshot_path(&project));
        tracing::debug!(
            root = %project.root().display(),
            snapshot = %store.path().display(),
            "opened project"
        );
        Ok(Self {
            project,
            config,
            store,
        })
    }

    /// Current dataset (the sample dataset when nothing is stored)
    pub fn load(&self) -> Dataset {
        self.store.load()
    }

    pub fn save(&self, data: &Dataset) -> Result<()> {
        self.store.save(data).into_diagnostic()
    }

    /// `--format`, with `auto` replaced by the configured default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        global.format.resolve(self.config.default_format.as_deref())
    }

    /// Amount in `currency` with the configured precision
    pub fn money(&self, value: f64, currency: &str) -> String {
        format_amount(value, currency, self.config.precision())
    }

    /// Amount in the configured display currency
    pub fn display_money(&self, value: f64) -> String {
        self.money(value, &self.config.currency())
    }
}

/// Format a RecordId for display, truncating if too long
///
/// Generated ids are 30+ chars (`PROD-` plus a ULID); they are cut to 13
/// chars with a "..." suffix. Short hand-written ids pass through.
pub fn format_short_id(id: &RecordId) -> String {
    format_short_id_str(id.as_str())
}

pub fn format_short_id_str(id: &str) -> String {
    if id.chars().count() > 16 {
        let head: String = id.chars().take(13).collect();
        format!("{}...", head)
    } else {
        id.to_string()
    }
}

/// Truncate a string to `max_len` characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print `value` as JSON or YAML when that format was requested
///
/// Returns `false` for every other format so the caller renders its own view.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value).into_diagnostic()?;
            println!("{}", json);
            Ok(true)
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(value).into_diagnostic()?;
            print!("{}", yaml);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// "✓ message" unless `--quiet`
pub fn print_success(global: &GlobalOpts, message: impl std::fmt::Display) {
    if !global.quiet {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Dim horizontal rule used by detail views
pub fn rule() -> String {
    style("─".repeat(60)).dim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::RecordPrefix;

    #[test]
    fn test_format_short_id() {
        let id = RecordId::new(RecordPrefix::Prod);
        let formatted = format_short_id(&id);
        assert_eq!(formatted.chars().count(), 16);
        assert!(formatted.ends_with("..."));
        assert_eq!(format_short_id(&RecordId::from("mat-1")), "mat-1");
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("帆布トートバッグ", 5), "帆布...");
        assert_eq!(format_short_id_str("製品製品製品製品製品製品製品製品製品"), "製品製品製品製品製品製品製...");
    }
}
