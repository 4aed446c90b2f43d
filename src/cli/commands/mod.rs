//! CLI command implementations

pub mod category;
pub mod completions;
pub mod config;
pub mod cost;
pub mod data;
pub mod init;
pub mod master;
pub mod product;
