//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    category::CategoryCommands, completions::CompletionsArgs, config::ConfigCommands,
    cost::CostCommands, data::DataCommands, init::InitArgs, master::MasterCommands,
    product::ProductCommands,
};

#[derive(Parser)]
#[command(name = "costbook")]
#[command(author, version, about = "Unit cost accounting for small manufacturers")]
#[command(
    long_about = "Keeps master data, products and per-unit cost lines in a single JSON snapshot and computes an eight-category unit cost breakdown per product."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .costbook/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new costbook project
    Init(InitArgs),

    /// Unit cost breakdowns and cost lines
    #[command(subcommand)]
    Cost(CostCommands),

    /// Product management (sheets, apply, remove)
    #[command(subcommand)]
    Product(ProductCommands),

    /// Master data (materials, packaging, labor, equipment, shipping)
    #[command(subcommand)]
    Master(MasterCommands),

    /// Product category tree (large / medium / small)
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Snapshot status, import/export, reset and sample data
    #[command(subcommand)]
    Data(DataCommands),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (table for lists, detail for show)
    #[default]
    Auto,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default format
    pub fn resolve(self, configured: Option<&str>) -> OutputFormat {
        if self != OutputFormat::Auto {
            return self;
        }
        configured
            .and_then(|name| OutputFormat::from_str(name, true).ok())
            .unwrap_or(OutputFormat::Auto)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_format() {
        assert_eq!(OutputFormat::Json.resolve(Some("csv")), OutputFormat::Json);
        assert_eq!(OutputFormat::Auto.resolve(Some("CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::Auto.resolve(Some("bogus")), OutputFormat::Auto);
        assert_eq!(OutputFormat::Auto.resolve(None), OutputFormat::Auto);
    }
}
