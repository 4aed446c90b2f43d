//! Cost computation
//!
//! - [`aggregator`] - per-unit cost breakdown of a product
//! - [`usage`] - material and equipment usage across products
//! - [`lines`] - per-entry cost rows

pub mod aggregator;
pub mod lines;
pub mod usage;

pub use aggregator::{
    compute_all, compute_unit_cost, CostBreakdown, CostCategory, MasterIndex, ProductCost,
};
pub use lines::{cost_lines, CostLine};
pub use usage::{
    equipment_usage_groups, material_usage_groups, EquipmentUsageGroup, EquipmentUsageLine,
    MaterialUsageGroup, MaterialUsageLine,
};
