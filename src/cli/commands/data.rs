//! `costbook data` command - Snapshot status, import/export, reset
//!
//! The snapshot is replaced as a whole: an import parses the complete file
//! before anything is written, and reset/seed overwrite every record.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{print_structured, print_success, Workspace};
use crate::cli::GlobalOpts;
use crate::core::{Dataset, STORAGE_KEY};

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Show snapshot location and record counts
    Status,

    /// Write the current snapshot to a JSON file
    Export(ExportArgs),

    /// Replace the snapshot with a JSON file
    Import(ImportArgs),

    /// Replace the snapshot with an empty dataset
    Reset(ConfirmArgs),

    /// Replace the snapshot with the sample dataset
    Seed(ConfirmArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Target file
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Snapshot file to import
    pub file: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ConfirmArgs {
    /// Required: every stored record is overwritten
    #[arg(long)]
    pub yes: bool,
}

pub fn run(cmd: DataCommands, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    match cmd {
        DataCommands::Status => run_status(&ws, global),
        DataCommands::Export(args) => {
            let data = ws.store.export(&args.file).into_diagnostic()?;
            print_success(
                global,
                format!(
                    "Exported {} product(s) to {}",
                    data.products.len(),
                    style(args.file.display()).cyan()
                ),
            );
            Ok(())
        }
        DataCommands::Import(args) => {
            let data = ws.store.import(&args.file).into_diagnostic()?;
            print_success(
                global,
                format!(
                    "Imported {} ({})",
                    style(args.file.display()).cyan(),
                    counts(&data)
                ),
            );
            Ok(())
        }
        DataCommands::Reset(args) => {
            require_confirmation(&args, "reset")?;
            ws.store.reset().into_diagnostic()?;
            print_success(global, "Snapshot reset to an empty dataset");
            Ok(())
        }
        DataCommands::Seed(args) => {
            require_confirmation(&args, "seed")?;
            let data = ws.store.seed().into_diagnostic()?;
            print_success(global, format!("Snapshot replaced with sample data ({})", counts(&data)));
            Ok(())
        }
    }
}

fn require_confirmation(args: &ConfirmArgs, action: &str) -> Result<()> {
    if args.yes {
        Ok(())
    } else {
        Err(miette::miette!(
            "This overwrites every stored record. Re-run as `costbook data {} --yes`",
            action
        ))
    }
}

fn counts(data: &Dataset) -> String {
    format!(
        "{} master record(s), {} product(s), {} cost line(s)",
        data.master_count(),
        data.products.len(),
        data.cost_entry_count()
    )
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    storage_key: &'static str,
    path: PathBuf,
    stored: bool,
    readable: bool,
    categories: usize,
    masters: usize,
    products: usize,
    cost_entries: usize,
}

fn run_status(ws: &Workspace, global: &GlobalOpts) -> Result<()> {
    let stored = ws.store.exists();
    let readable = ws.store.try_load().is_ok();
    let data = ws.load();

    let status = Status {
        storage_key: STORAGE_KEY,
        path: ws.store.path().to_path_buf(),
        stored,
        readable,
        categories: data.categories.len(),
        masters: data.master_count(),
        products: data.products.len(),
        cost_entries: data.cost_entry_count(),
    };
    if print_structured(&status, ws.format(global))? {
        return Ok(());
    }

    let state = match (stored, readable) {
        (false, _) => style("not stored yet, showing sample data").yellow(),
        (true, false) => style("unreadable, showing sample data").red(),
        (true, true) => style("ok").green(),
    };
    println!("{}: {}", style("Snapshot").bold(), style(status.path.display()).cyan());
    println!("{}: {}", style("Status").bold(), state);
    println!();
    println!("  {:<14}{:>6}", "categories", status.categories);
    println!("  {:<14}{:>6}", "materials", data.materials.len());
    println!("  {:<14}{:>6}", "packaging", data.packaging_items.len());
    println!("  {:<14}{:>6}", "labor roles", data.labor_roles.len());
    println!("  {:<14}{:>6}", "equipment", data.equipments.len());
    println!("  {:<14}{:>6}", "shipping", data.shipping_methods.len());
    println!("  {:<14}{:>6}", "products", status.products);
    println!("  {:<14}{:>6}", "cost lines", status.cost_entries);
    Ok(())
}
