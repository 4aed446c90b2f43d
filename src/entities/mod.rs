//! Record type definitions
//!
//! Costbook stores the following record types:
//!
//! **Master data:**
//! - [`Material`] - Raw materials bought in lots
//! - [`PackagingItem`] - Boxes, bags and cushioning
//! - [`LaborRole`] - Kinds of work with an hourly rate
//! - [`Equipment`] - Machines amortized over years
//! - [`ShippingMethod`] - Delivery options with a per-unit cost
//! - [`Categories`] - Large / medium / small product grouping
//!
//! **Products and costs:**
//! - [`Product`] - The unit being costed
//! - [`cost_entry`] - Eight kinds of per-product cost line items

pub mod category;
pub mod cost_entry;
pub mod equipment;
pub mod labor;
pub mod material;
pub mod packaging;
pub mod product;
pub mod shipping;

pub use category::{Categories, CategoryLarge, CategoryLevel, CategoryMedium, CategorySmall};
pub use cost_entry::{
    CostBatch, CostEntries, DevelopmentCostEntry, ElectricityCostEntry, EquipmentAllocationEntry,
    LaborCostEntry, LogisticsCostEntry, MaterialCostEntry, OutsourcingCostEntry,
    PackagingCostEntry,
};
pub use equipment::Equipment;
pub use labor::LaborRole;
pub use material::Material;
pub use packaging::PackagingItem;
pub use product::{ExpectedProduction, Product, SizeVariant};
pub use shipping::ShippingMethod;
