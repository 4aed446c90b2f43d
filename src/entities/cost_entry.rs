//! Per-product cost line items
//!
//! Each entry attributes one cost category to one product through its
//! `product_id`, and most reference a master record by id. References are
//! soft: nothing guarantees the referenced record still exists, and the
//! costing code treats a dangling reference as a zero contribution.

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, CostEntry};
use crate::core::identity::{RecordId, RecordPrefix};

/// Material consumed by one unit
///
/// `cost_per_unit` is fixed when the entry is created
/// (`unit_cost × usage_ratio / 100`) and trusted as-is afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    pub material_id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Percent of a purchased lot consumed by one unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_ratio: Option<f64>,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub cost_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Packaging used per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    pub packaging_item_id: RecordId,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub quantity: f64,

    /// Unit cost of the packaging item at entry creation
    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub cost_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Labor hours spent per unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    pub labor_role_id: RecordId,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub hours: f64,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub people_count: f64,

    /// Takes precedence over the labor role's hourly rate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate_override: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutsourcingCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub cost_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One-off development spend (prototypes, tooling) amortized over production
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevelopmentCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub prototype_labor_cost: f64,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub prototype_material_cost: f64,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub tooling_cost: f64,

    #[serde(default = "one", deserialize_with = "crate::core::entity::number_or_one")]
    pub amortization_years: f64,
}

impl DevelopmentCostEntry {
    /// Title used when none was given
    pub const DEFAULT_TITLE: &'static str = "Development cost";

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(Self::DEFAULT_TITLE)
    }

    pub fn total(&self) -> f64 {
        self.prototype_labor_cost + self.prototype_material_cost + self.tooling_cost
    }
}

/// Share of an equipment's annual cost attributed to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentAllocationEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    pub equipment_id: RecordId,

    /// Manual share (0-1), used when usage hours are unknown
    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub allocation_ratio: f64,

    #[serde(default = "one", deserialize_with = "crate::core::entity::number_or_one")]
    pub annual_quantity: f64,

    /// Measured equipment hours per unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogisticsCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    pub shipping_method_id: RecordId,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub cost_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityCostEntry {
    #[serde(default)]
    pub id: RecordId,

    pub product_id: RecordId,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub cost_per_unit: f64,

    #[serde(default = "default_currency")]
    pub currency: String,
}

fn one() -> f64 {
    1.0
}

impl CostEntry for MaterialCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Mce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for PackagingCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Pce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for LaborCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Lce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for OutsourcingCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Oce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for DevelopmentCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Dce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for EquipmentAllocationEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Eae;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for LogisticsCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Gce;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

impl CostEntry for ElectricityCostEntry {
    const PREFIX: RecordPrefix = RecordPrefix::Ece;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn product_id(&self) -> &RecordId {
        &self.product_id
    }

    fn set_product_id(&mut self, product_id: RecordId) {
        self.product_id = product_id;
    }
}

/// The eight cost-entry lists of a snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostEntries {
    #[serde(default)]
    pub materials: Vec<MaterialCostEntry>,

    #[serde(default)]
    pub packaging: Vec<PackagingCostEntry>,

    #[serde(default)]
    pub labor: Vec<LaborCostEntry>,

    #[serde(default)]
    pub outsourcing: Vec<OutsourcingCostEntry>,

    #[serde(default)]
    pub development: Vec<DevelopmentCostEntry>,

    #[serde(default)]
    pub equipment_allocations: Vec<EquipmentAllocationEntry>,

    #[serde(default)]
    pub logistics: Vec<LogisticsCostEntry>,

    #[serde(default)]
    pub electricity: Vec<ElectricityCostEntry>,
}

/// A product's full set of cost entries, stored or replaced as one batch
pub type CostBatch = CostEntries;

impl CostEntries {
    pub fn len(&self) -> usize {
        self.materials.len()
            + self.packaging.len()
            + self.labor.len()
            + self.outsourcing.len()
            + self.development.len()
            + self.equipment_allocations.len()
            + self.logistics.len()
            + self.electricity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry attributed to `product_id`, returning how many were removed
    pub fn remove_product(&mut self, product_id: &str) -> usize {
        let before = self.len();
        retain_other(&mut self.materials, product_id);
        retain_other(&mut self.packaging, product_id);
        retain_other(&mut self.labor, product_id);
        retain_other(&mut self.outsourcing, product_id);
        retain_other(&mut self.development, product_id);
        retain_other(&mut self.equipment_allocations, product_id);
        retain_other(&mut self.logistics, product_id);
        retain_other(&mut self.electricity, product_id);
        before - self.len()
    }

    /// Append a batch, attributing every entry to `product_id` and filling missing ids
    pub fn append_batch(&mut self, product_id: &RecordId, batch: CostBatch) {
        extend_for(&mut self.materials, batch.materials, product_id);
        extend_for(&mut self.packaging, batch.packaging, product_id);
        extend_for(&mut self.labor, batch.labor, product_id);
        extend_for(&mut self.outsourcing, batch.outsourcing, product_id);
        extend_for(&mut self.development, batch.development, product_id);
        extend_for(&mut self.equipment_allocations, batch.equipment_allocations, product_id);
        extend_for(&mut self.logistics, batch.logistics, product_id);
        extend_for(&mut self.electricity, batch.electricity, product_id);
    }

    /// Copy out every entry attributed to `product_id`
    pub fn batch_for(&self, product_id: &str) -> CostBatch {
        CostBatch {
            materials: owned_for(&self.materials, product_id),
            packaging: owned_for(&self.packaging, product_id),
            labor: owned_for(&self.labor, product_id),
            outsourcing: owned_for(&self.outsourcing, product_id),
            development: owned_for(&self.development, product_id),
            equipment_allocations: owned_for(&self.equipment_allocations, product_id),
            logistics: owned_for(&self.logistics, product_id),
            electricity: owned_for(&self.electricity, product_id),
        }
    }
}

fn retain_other<E: CostEntry>(entries: &mut Vec<E>, product_id: &str) {
    entries.retain(|e| e.product_id() != product_id);
}

fn extend_for<E: CostEntry>(entries: &mut Vec<E>, batch: Vec<E>, product_id: &RecordId) {
    entries.extend(batch.into_iter().map(|mut entry| {
        entry.set_product_id(product_id.clone());
        if entry.id().is_empty() {
            entry.set_id(RecordId::new(E::PREFIX));
        }
        entry
    }));
}

fn owned_for<E: CostEntry>(entries: &[E], product_id: &str) -> Vec<E> {
    entries
        .iter()
        .filter(|e| e.product_id() == product_id)
        .cloned()
        .collect()
}
