//! `costbook init` command - Initialize a new costbook project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::project::{Project, ProjectError, PROJECT_DIR};
use crate::core::STORAGE_KEY;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Start with an empty dataset instead of the sample data
    #[arg(long)]
    pub empty: bool,

    /// Force initialization even if .costbook/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        if !global.quiet {
            println!(
                "{} Created directory {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
    }

    let project = if args.force {
        Project::init_force(&path, args.empty)
    } else {
        Project::init(&path, args.empty)
    };

    match project {
        Ok(project) => {
            if global.quiet {
                return Ok(());
            }
            println!(
                "{} Initialized costbook project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            println!("  {}", style(format!("{}/", PROJECT_DIR)).dim());
            println!("  {}", style(format!("{}/config.yaml", PROJECT_DIR)).dim());
            println!(
                "  {} ({})",
                style(format!("{}/{}.json", PROJECT_DIR, STORAGE_KEY)).dim(),
                if args.empty { "empty" } else { "sample data" }
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Unit cost of every product",
                style("costbook cost summary").yellow()
            );
            println!(
                "  {} Start a new product sheet",
                style("costbook product template > sheet.yaml").yellow()
            );
            println!(
                "  {} Register it",
                style("costbook product apply sheet.yaml").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} costbook project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!(
                "Use {} to reinitialize",
                style("costbook init --force").yellow()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
