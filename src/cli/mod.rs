//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;
pub mod table;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};
pub use helpers::Workspace;
