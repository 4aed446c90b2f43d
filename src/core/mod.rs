//! Core module - fundamental types and utilities

pub mod config;
pub mod dataset;
pub mod entity;
pub mod identity;
pub mod money;
pub mod project;
pub mod sample;
pub mod sheet;
pub mod store;

pub use config::Config;
pub use dataset::{Dataset, DatasetError, ProductEntries};
pub use entity::{CostEntry, Record};
pub use identity::{IdParseError, RecordId, RecordPrefix};
pub use project::{Project, ProjectError};
pub use sheet::{ProductSheet, SheetError};
pub use store::{SnapshotStore, StoreError, STORAGE_KEY};
