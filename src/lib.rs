//! Costbook: unit cost accounting for small manufacturers
//!
//! Master data (materials, packaging, labor, equipment, shipping), products
//! and their per-unit cost lines live in a single JSON snapshot. The
//! [`costing`] module turns a product's cost lines into an eight-category
//! per-unit breakdown.

pub mod cli;
pub mod core;
pub mod costing;
pub mod entities;
pub mod logging;
