//! `costbook config` command - Configuration management
//!
//! Values are read from, in increasing priority: the global config file,
//! the project's `.costbook/config.yaml`, then `COSTBOOK_CURRENCY` /
//! `COSTBOOK_DATA`.

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::CONFIG_KEYS;
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path(PathArgs),

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's effective value
    pub key: Option<String>,

    /// Show only project-level config
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global (user) config
    #[arg(long = "global-only")]
    pub global_only: bool,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (see `costbook config keys`)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of project config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Show only project config path
    #[arg(long = "project-only")]
    pub project_only: bool,

    /// Show only global config path
    #[arg(long = "global-only")]
    pub global_only: bool,
}

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args, global),
        ConfigCommands::Set(args) => run_set(args, global),
        ConfigCommands::Unset(args) => run_unset(args, global),
        ConfigCommands::Path(args) => run_path(args, global),
        ConfigCommands::Keys => run_keys(),
    }
}

fn discover(global: &GlobalOpts) -> Result<Project> {
    match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = discover(global).ok();
    let config = Config::load_for(project.as_ref());

    if let Some(key) = &args.key {
        if !Config::is_valid_key(key) {
            return Err(unknown_key(key));
        }
        return match config.get(key) {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        let path = get_project_config_path(global)?;
        show_config_file("Project config:", &path)?;
    } else if args.global_only {
        let path = get_global_config_path()?;
        show_config_file("Global config:", &path)?;
    } else {
        println!("{}", style("Effective Configuration").bold().underlined());
        println!();

        for (key, _) in CONFIG_KEYS {
            print_config_value(key, config.get(key).as_deref());
        }
        if let Some(project) = &project {
            println!();
            println!(
                "  {}: {}",
                style("snapshot").cyan(),
                style(config.snapshot_path(project).display()).dim()
            );
        }

        println!();
        println!("{}", style("Config Sources (in priority order):").dim());
        println!("  1. Environment variables (COSTBOOK_CURRENCY, COSTBOOK_DATA)");
        println!("  2. Project config (.costbook/config.yaml)");
        println!("  3. Global config (~/.config/costbook/config.yaml)");
    }

    Ok(())
}

/// Check a value and convert it to the YAML type stored for `key`
fn parse_value(key: &str, value: &str) -> Result<serde_yml::Value> {
    let value = value.trim();
    match key {
        "precision" => {
            let digits: u64 = value
                .parse()
                .map_err(|_| miette::miette!("precision must be a whole number, got '{}'", value))?;
            if digits > 6 {
                return Err(miette::miette!("precision must be between 0 and 6"));
            }
            Ok(serde_yml::Value::Number(digits.into()))
        }
        "default_format" => {
            OutputFormat::from_str(value, true).map_err(|_| {
                miette::miette!(
                    "Unknown format '{}'. Use one of: auto, tsv, json, yaml, csv, md, id",
                    value
                )
            })?;
            Ok(serde_yml::Value::String(value.to_lowercase()))
        }
        "currency" => {
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(miette::miette!(
                    "currency must be a code such as JPY or USD, got '{}'",
                    value
                ));
            }
            Ok(serde_yml::Value::String(value.to_uppercase()))
        }
        _ => {
            if value.is_empty() {
                return Err(miette::miette!("{} cannot be empty", key));
            }
            Ok(serde_yml::Value::String(value.to_string()))
        }
    }
}

fn read_mapping(path: &Path) -> Result<serde_yml::Mapping> {
    if !path.exists() {
        return Ok(serde_yml::Mapping::new());
    }
    let content = fs::read_to_string(path).into_diagnostic()?;
    match serde_yml::from_str::<serde_yml::Value>(&content) {
        Ok(serde_yml::Value::Mapping(map)) => Ok(map),
        // Comment-only or empty files parse as null
        Ok(serde_yml::Value::Null) => Ok(serde_yml::Mapping::new()),
        Ok(_) => Err(miette::miette!(
            "{} is not a key/value mapping",
            path.display()
        )),
        Err(e) => Err(miette::miette!("Invalid config {}: {}", path.display(), e)),
    }
}

fn write_mapping(path: &Path, map: serde_yml::Mapping) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    let yaml = serde_yml::to_string(&serde_yml::Value::Mapping(map)).into_diagnostic()?;
    fs::write(path, yaml).into_diagnostic()
}

fn run_set(args: SetArgs, global: &GlobalOpts) -> Result<()> {
    if !Config::is_valid_key(&args.key) {
        return Err(unknown_key(&args.key));
    }
    let value = parse_value(&args.key, &args.value)?;

    let config_path = if args.global {
        get_global_config_path()?
    } else {
        get_project_config_path(global)?
    };

    let mut map = read_mapping(&config_path)?;
    map.insert(serde_yml::Value::String(args.key.clone()), value);
    write_mapping(&config_path, map)?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!(
            "{} Set {} {} {} in {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            style("→").dim(),
            style(args.value.trim()).yellow(),
            scope
        );
    }
    Ok(())
}

fn run_unset(args: UnsetArgs, global: &GlobalOpts) -> Result<()> {
    let config_path = if args.global {
        get_global_config_path()?
    } else {
        get_project_config_path(global)?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut map = read_mapping(&config_path)?;
    if map
        .remove(&serde_yml::Value::String(args.key.clone()))
        .is_none()
    {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }
    write_mapping(&config_path, map)?;

    if !global.quiet {
        let scope = if args.global { "global" } else { "project" };
        println!(
            "{} Removed {} from {} config",
            style("✓").green(),
            style(&args.key).cyan(),
            scope
        );
    }
    Ok(())
}

fn run_path(args: PathArgs, global: &GlobalOpts) -> Result<()> {
    if args.project_only && args.global_only {
        return Err(miette::miette!(
            "Cannot specify both --project-only and --global-only"
        ));
    }

    if args.project_only {
        println!("{}", get_project_config_path(global)?.display());
        return Ok(());
    }
    if args.global_only {
        println!("{}", get_global_config_path()?.display());
        return Ok(());
    }

    let exists = |path: &Path| {
        if path.exists() {
            style("(exists)").green()
        } else {
            style("(not created)").dim()
        }
    };

    println!("{}", style("Configuration file paths:").bold());
    println!();
    let global_path = get_global_config_path()?;
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    println!("          {}", exists(&global_path));
    println!();
    match get_project_config_path(global) {
        Ok(path) => {
            println!("  {} {}", style("Project:").cyan(), path.display());
            println!("          {}", exists(&path));
        }
        Err(_) => println!(
            "  {} {}",
            style("Project:").cyan(),
            style("(not in a costbook project)").dim()
        ),
    }
    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in CONFIG_KEYS {
        println!("  {:<20} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'costbook config set <key> <value>' to set a value.").dim()
    );
    Ok(())
}

fn unknown_key(key: &str) -> miette::Report {
    let keys: Vec<&str> = CONFIG_KEYS.iter().map(|(k, _)| *k).collect();
    miette::miette!("Unknown config key '{}'. Valid keys: {}", key, keys.join(", "))
}

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

fn get_project_config_path(global: &GlobalOpts) -> Result<PathBuf> {
    Ok(discover(global)?.config_path())
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), style(v).yellow()),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

fn show_config_file(title: &str, path: &Path) -> Result<()> {
    println!("{} {}", style(title).bold(), style(path.display()).dim());
    println!();
    if path.exists() {
        print!("{}", fs::read_to_string(path).into_diagnostic()?);
    } else {
        println!("{}", style("(not created)").dim());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_precision() {
        assert_eq!(
            parse_value("precision", "2").unwrap(),
            serde_yml::Value::Number(2u64.into())
        );
        assert!(parse_value("precision", "7").is_err());
        assert!(parse_value("precision", "two").is_err());
    }

    #[test]
    fn test_parse_currency_and_format() {
        assert_eq!(
            parse_value("currency", " usd ").unwrap(),
            serde_yml::Value::String("USD".into())
        );
        assert!(parse_value("currency", "US$").is_err());
        assert_eq!(
            parse_value("default_format", "CSV").unwrap(),
            serde_yml::Value::String("csv".into())
        );
        assert!(parse_value("default_format", "xml").is_err());
    }

    #[test]
    fn test_mapping_round_trip_keeps_other_keys() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "# comment only\n").unwrap();
        assert!(read_mapping(&path).unwrap().is_empty());

        let mut map = read_mapping(&path).unwrap();
        map.insert("currency".into(), "USD".into());
        map.insert("precision".into(), serde_yml::Value::Number(2u64.into()));
        write_mapping(&path, map).unwrap();

        let config = Config::read_file(&path).unwrap();
        assert_eq!(config.currency(), "USD");
        assert_eq!(config.precision(), 2);
    }

    #[test]
    fn test_read_mapping_rejects_lists() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        fs::write(&path, "- a\n- b\n").unwrap();
        assert!(read_mapping(&path).is_err());
    }
}
