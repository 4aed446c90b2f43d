//! Unit cost aggregation
//!
//! [`compute_unit_cost`] turns a product's cost entries into an eight-way
//! per-unit breakdown. It only reads the dataset and keeps nothing from it,
//! so calling it twice on an unchanged dataset gives identical results.
//!
//! Degenerate input never fails the computation:
//! - references to missing master records contribute 0
//! - NaN and infinite contributions become 0
//! - year and quantity divisors are floored to 1
//!
//! Currencies are carried on entries but never converted; amounts in
//! different currencies are summed as raw magnitudes.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::dataset::Dataset;
use crate::core::identity::RecordId;
use crate::core::money::{divisor, finite_or_zero};
use crate::entities::{
    DevelopmentCostEntry, Equipment, EquipmentAllocationEntry, LaborCostEntry, LaborRole, Product,
};

/// The eight cost categories of a unit cost breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCategory {
    Material,
    Packaging,
    Labor,
    Outsourcing,
    Development,
    Equipment,
    Logistics,
    Electricity,
}

impl CostCategory {
    pub const ALL: [CostCategory; 8] = [
        CostCategory::Material,
        CostCategory::Packaging,
        CostCategory::Labor,
        CostCategory::Outsourcing,
        CostCategory::Development,
        CostCategory::Equipment,
        CostCategory::Logistics,
        CostCategory::Electricity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CostCategory::Material => "material",
            CostCategory::Packaging => "packaging",
            CostCategory::Labor => "labor",
            CostCategory::Outsourcing => "outsourcing",
            CostCategory::Development => "development",
            CostCategory::Equipment => "equipment",
            CostCategory::Logistics => "logistics",
            CostCategory::Electricity => "electricity",
        }
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CostCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CostCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                format!(
                    "Invalid cost category: {}. Use one of: {}",
                    s,
                    CostCategory::ALL.map(|c| c.as_str()).join(", ")
                )
            })
    }
}

/// Per-unit cost of one product, split by category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub material: f64,
    pub packaging: f64,
    pub labor: f64,
    pub outsourcing: f64,
    pub development: f64,
    pub equipment: f64,
    pub logistics: f64,
    pub electricity: f64,
    /// Sum of the eight categories above
    pub total: f64,
}

impl CostBreakdown {
    pub fn get(&self, category: CostCategory) -> f64 {
        match category {
            CostCategory::Material => self.material,
            CostCategory::Packaging => self.packaging,
            CostCategory::Labor => self.labor,
            CostCategory::Outsourcing => self.outsourcing,
            CostCategory::Development => self.development,
            CostCategory::Equipment => self.equipment,
            CostCategory::Logistics => self.logistics,
            CostCategory::Electricity => self.electricity,
        }
    }

    /// Category values in display order
    pub fn components(&self) -> impl Iterator<Item = (CostCategory, f64)> + '_ {
        CostCategory::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    fn sum_components(&self) -> f64 {
        self.material
            + self.packaging
            + self.labor
            + self.outsourcing
            + self.development
            + self.equipment
            + self.logistics
            + self.electricity
    }
}

/// A product together with its computed breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ProductCost {
    pub product_id: RecordId,
    pub product_name: String,
    pub costs: CostBreakdown,
}

/// Id lookups for the master records the aggregator dereferences
pub struct MasterIndex<'a> {
    labor_roles: HashMap<&'a str, &'a LaborRole>,
    equipments: HashMap<&'a str, &'a Equipment>,
}

impl<'a> MasterIndex<'a> {
    pub fn new(data: &'a Dataset) -> Self {
        // First record wins on duplicate ids, matching a linear search
        let mut labor_roles = HashMap::new();
        for role in &data.labor_roles {
            labor_roles.entry(role.id.as_str()).or_insert(role);
        }
        let mut equipments = HashMap::new();
        for equipment in &data.equipments {
            equipments.entry(equipment.id.as_str()).or_insert(equipment);
        }
        Self {
            labor_roles,
            equipments,
        }
    }

    pub fn labor_role(&self, id: &str) -> Option<&'a LaborRole> {
        self.labor_roles.get(id).copied()
    }

    pub fn equipment(&self, id: &str) -> Option<&'a Equipment> {
        self.equipments.get(id).copied()
    }
}

/// Production quantity of the product, 1 when the product is unknown
pub fn quantity_divisor(product: Option<&Product>) -> f64 {
    product.map_or(1.0, Product::quantity_divisor)
}

/// Override, then the role's rate, then 0
pub fn resolve_hourly_rate(entry: &LaborCostEntry, role: Option<&LaborRole>) -> f64 {
    entry
        .hourly_rate_override
        .or_else(|| role.map(|r| r.hourly_rate))
        .unwrap_or(0.0)
}

pub fn labor_unit_cost(entry: &LaborCostEntry, role: Option<&LaborRole>) -> f64 {
    finite_or_zero(resolve_hourly_rate(entry, role) * entry.hours * entry.people_count)
}

/// Development spend per year, spread over the product's expected quantity
pub fn development_unit_cost(entry: &DevelopmentCostEntry, product_quantity: f64) -> f64 {
    let amortized = entry.total() / divisor(entry.amortization_years);
    finite_or_zero(amortized / divisor(product_quantity))
}

/// Sum of usage hours over a product's allocation group, missing hours as 0
pub fn total_usage_hours<'e>(entries: impl IntoIterator<Item = &'e EquipmentAllocationEntry>) -> f64 {
    entries
        .into_iter()
        .map(|e| e.usage_hours.map(finite_or_zero).unwrap_or(0.0))
        .sum()
}

/// Share of the equipment's annual cost carried by this entry
///
/// Usage hours win when the group has a positive hour total and this entry
/// recorded hours; otherwise the stored allocation ratio is used. The switch
/// is decided per group: an entry without hours in an hours-based group gets
/// its stored ratio, not a zero share.
pub fn equipment_ratio(entry: &EquipmentAllocationEntry, group_usage_hours: f64) -> f64 {
    match entry.usage_hours {
        Some(hours) if group_usage_hours > 0.0 => hours / group_usage_hours,
        _ => entry.allocation_ratio,
    }
}

/// Divisor for spreading annual equipment cost: the entry's annual quantity,
/// falling back to the product quantity when unset, floored to 1
pub fn annual_quantity_divisor(entry: &EquipmentAllocationEntry, product_quantity: f64) -> f64 {
    let quantity = if entry.annual_quantity == 0.0 || entry.annual_quantity.is_nan() {
        product_quantity
    } else {
        entry.annual_quantity
    };
    divisor(quantity)
}

pub fn equipment_unit_cost(
    entry: &EquipmentAllocationEntry,
    equipment: &Equipment,
    group_usage_hours: f64,
    product_quantity: f64,
) -> f64 {
    let annual_cost = equipment.annual_cost();
    let ratio = equipment_ratio(entry, group_usage_hours);
    finite_or_zero(annual_cost * ratio / annual_quantity_divisor(entry, product_quantity))
}

fn sum(values: impl Iterator<Item = f64>) -> f64 {
    values.map(finite_or_zero).sum()
}

/// Compute the per-unit cost breakdown of `product_id`
///
/// An unknown product id is not an error: its entries (normally none) are
/// still summed and the quantity divisor defaults to 1.
pub fn compute_unit_cost(product_id: &str, data: &Dataset) -> CostBreakdown {
    let index = MasterIndex::new(data);
    compute_with_index(product_id, data, &index)
}

fn compute_with_index(product_id: &str, data: &Dataset, index: &MasterIndex<'_>) -> CostBreakdown {
    let entries = data.entries_for(product_id);
    let product_quantity = quantity_divisor(data.find_product(product_id));

    let material = sum(entries.materials.iter().map(|e| e.cost_per_unit));

    let packaging = sum(entries.packaging.iter().map(|e| e.quantity * e.cost_per_unit));

    let labor = sum(entries.labor.iter().map(|e| {
        let role = index.labor_role(e.labor_role_id.as_str());
        if role.is_none() && e.hourly_rate_override.is_none() {
            tracing::debug!(
                product = product_id,
                labor_role = %e.labor_role_id,
                "labor role not found, contributing 0"
            );
        }
        labor_unit_cost(e, role)
    }));

    let outsourcing = sum(entries.outsourcing.iter().map(|e| e.cost_per_unit));

    let development = sum(
        entries
            .development
            .iter()
            .map(|e| development_unit_cost(e, product_quantity)),
    );

    let group_hours = total_usage_hours(entries.equipment_allocations.iter().copied());
    let equipment = sum(entries.equipment_allocations.iter().map(|e| {
        match index.equipment(e.equipment_id.as_str()) {
            Some(equipment) => equipment_unit_cost(e, equipment, group_hours, product_quantity),
            None => {
                tracing::debug!(
                    product = product_id,
                    equipment = %e.equipment_id,
                    "equipment not found, contributing 0"
                );
                0.0
            }
        }
    }));

    let logistics = sum(entries.logistics.iter().map(|e| e.cost_per_unit));

    let electricity = sum(entries.electricity.iter().map(|e| e.cost_per_unit));

    let mut breakdown = CostBreakdown {
        material,
        packaging,
        labor,
        outsourcing,
        development,
        equipment,
        logistics,
        electricity,
        total: 0.0,
    };
    breakdown.total = breakdown.sum_components();
    breakdown
}

/// Breakdowns for every product, in dataset order
pub fn compute_all(data: &Dataset) -> Vec<ProductCost> {
    let index = MasterIndex::new(data);
    data.products
        .iter()
        .map(|product| ProductCost {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            costs: compute_with_index(product.id.as_str(), data, &index),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        ElectricityCostEntry, LaborRole, MaterialCostEntry, OutsourcingCostEntry,
    };

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn sample() -> Dataset {
        Dataset::sample()
    }

    fn allocation(equipment: &str, ratio: f64, annual: f64, hours: Option<f64>) -> EquipmentAllocationEntry {
        EquipmentAllocationEntry {
            id: RecordId::default(),
            product_id: "prod-1".into(),
            equipment_id: equipment.into(),
            allocation_ratio: ratio,
            annual_quantity: annual,
            usage_hours: hours,
        }
    }

    #[test]
    fn test_sample_material_and_packaging() {
        let costs = compute_unit_cost("prod-1", &sample());
        assert!(close(costs.material, 530.0));
        assert!(close(costs.packaging, 95.0));
    }

    #[test]
    fn test_sample_labor() {
        let costs = compute_unit_cost("prod-1", &sample());
        // 1800 × 0.4 + 2200 × 0.8
        assert!(close(costs.labor, 2480.0));
    }

    #[test]
    fn test_sample_development() {
        let costs = compute_unit_cost("prod-1", &sample());
        // 250000 / 2 years / 3000 units
        assert!(close(costs.development, 125_000.0 / 3000.0));
    }

    #[test]
    fn test_sample_equipment_uses_hours() {
        let costs = compute_unit_cost("prod-1", &sample());
        // 80000 × 0.6 / 3000 + 120000 × 0.4 / 3000
        assert!(close(costs.equipment, 32.0));
    }

    #[test]
    fn test_sample_passthrough_and_total() {
        let costs = compute_unit_cost("prod-1", &sample());
        assert!(close(costs.outsourcing, 120.0));
        assert!(close(costs.logistics, 180.0));
        assert!(close(costs.electricity, 25.0));
        assert!(close(costs.total, 3503.0 + 2.0 / 3.0));
    }

    #[test]
    fn test_total_is_exact_sum() {
        let costs = compute_unit_cost("prod-1", &sample());
        let sum = costs.material
            + costs.packaging
            + costs.labor
            + costs.outsourcing
            + costs.development
            + costs.equipment
            + costs.logistics
            + costs.electricity;
        assert_eq!(costs.total, sum);
    }

    #[test]
    fn test_idempotent_and_non_mutating() {
        let data = sample();
        let before = data.clone();
        let a = compute_unit_cost("prod-1", &data);
        let b = compute_unit_cost("prod-1", &data);
        assert_eq!(a, b);
        assert_eq!(a.total.to_bits(), b.total.to_bits());
        assert_eq!(data, before);
    }

    #[test]
    fn test_unknown_product_is_all_zero() {
        let costs = compute_unit_cost("does-not-exist", &sample());
        assert_eq!(costs, CostBreakdown::default());
    }

    #[test]
    fn test_orphan_entries_still_counted_with_unit_divisor() {
        let mut data = Dataset::empty();
        data.cost_entries.outsourcing.push(OutsourcingCostEntry {
            id: RecordId::default(),
            product_id: "ghost".into(),
            cost_per_unit: 40.0,
            currency: "JPY".into(),
            note: None,
        });
        data.cost_entries.development.push(DevelopmentCostEntry {
            id: RecordId::default(),
            product_id: "ghost".into(),
            title: None,
            prototype_labor_cost: 100.0,
            prototype_material_cost: 0.0,
            tooling_cost: 0.0,
            amortization_years: 1.0,
        });
        let costs = compute_unit_cost("ghost", &data);
        assert_eq!(costs.outsourcing, 40.0);
        // no product: quantity divisor is 1
        assert_eq!(costs.development, 100.0);
        assert_eq!(costs.total, 140.0);
    }

    #[test]
    fn test_missing_labor_role_contributes_zero() {
        let mut data = sample();
        data.labor_roles.retain(|r| r.id != "lab-2");
        let costs = compute_unit_cost("prod-1", &data);
        assert!(close(costs.labor, 720.0));
    }

    #[test]
    fn test_hourly_rate_override_wins() {
        let mut data = sample();
        data.cost_entries.labor[0].hourly_rate_override = Some(1000.0);
        // override applies even when the role is gone
        data.cost_entries.labor[1].labor_role_id = "missing".into();
        data.cost_entries.labor[1].hourly_rate_override = Some(2000.0);
        let costs = compute_unit_cost("prod-1", &data);
        assert!(close(costs.labor, 1000.0 * 0.4 + 2000.0 * 0.8));
    }

    #[test]
    fn test_resolve_hourly_rate_order() {
        let role = LaborRole::new("Sewing", 2200.0);
        let mut entry = LaborCostEntry {
            id: RecordId::default(),
            product_id: "p".into(),
            labor_role_id: "r".into(),
            hours: 1.0,
            people_count: 2.0,
            hourly_rate_override: None,
        };
        assert_eq!(resolve_hourly_rate(&entry, Some(&role)), 2200.0);
        assert_eq!(resolve_hourly_rate(&entry, None), 0.0);
        entry.hourly_rate_override = Some(0.0);
        assert_eq!(resolve_hourly_rate(&entry, Some(&role)), 0.0);
        assert_eq!(labor_unit_cost(&entry, Some(&role)), 0.0);
    }

    #[test]
    fn test_missing_equipment_contributes_zero() {
        let mut data = sample();
        data.equipments.retain(|e| e.id != "eq-2");
        let costs = compute_unit_cost("prod-1", &data);
        // hour total still includes the dangling entry: 80000 × 0.6 / 3000
        assert!(close(costs.equipment, 16.0));
    }

    #[test]
    fn test_equipment_ratio_fallback_without_hours() {
        let mut data = sample();
        data.cost_entries.equipment_allocations = vec![
            allocation("eq-1", 0.5, 3000.0, None),
            allocation("eq-2", 0.3, 3000.0, None),
        ];
        let costs = compute_unit_cost("prod-1", &data);
        assert!(close(costs.equipment, 80_000.0 * 0.5 / 3000.0 + 120_000.0 * 0.3 / 3000.0));
    }

    #[test]
    fn test_equipment_ratio_fallback_zero_hours() {
        let a = allocation("eq-1", 0.5, 3000.0, Some(0.0));
        let b = allocation("eq-2", 0.3, 3000.0, Some(0.0));
        let total = total_usage_hours([&a, &b]);
        assert_eq!(total, 0.0);
        assert_eq!(equipment_ratio(&a, total), 0.5);
        assert_eq!(equipment_ratio(&b, total), 0.3);
    }

    #[test]
    fn test_equipment_mixed_group_switches_per_group() {
        let with_hours = allocation("eq-1", 0.5, 3000.0, Some(2.0));
        let without = allocation("eq-2", 0.3, 3000.0, None);
        let total = total_usage_hours([&with_hours, &without]);
        assert_eq!(total, 2.0);
        assert_eq!(equipment_ratio(&with_hours, total), 1.0);
        // no hours recorded: keeps its stored ratio even in an hours-based group
        assert_eq!(equipment_ratio(&without, total), 0.3);
    }

    #[test]
    fn test_annual_quantity_falls_back_to_product_quantity() {
        let entry = allocation("eq-1", 0.5, 0.0, None);
        assert_eq!(annual_quantity_divisor(&entry, 3000.0), 3000.0);
        let entry = allocation("eq-1", 0.5, -10.0, None);
        assert_eq!(annual_quantity_divisor(&entry, 3000.0), 1.0);
        let entry = allocation("eq-1", 0.5, f64::NAN, None);
        assert_eq!(annual_quantity_divisor(&entry, 1.0), 1.0);
    }

    #[test]
    fn test_zero_and_negative_divisors_stay_finite() {
        let mut data = sample();
        data.products[0].expected_production.quantity = 0.0;
        data.cost_entries.development[0].amortization_years = 0.0;
        data.cost_entries.equipment_allocations[0].annual_quantity = -1.0;
        data.equipments[0].amortization_years = -5.0;
        let costs = compute_unit_cost("prod-1", &data);
        for (_, value) in costs.components() {
            assert!(value.is_finite());
        }
        // 250000 / 1 / 1
        assert!(close(costs.development, 250_000.0));
        assert!(costs.total.is_finite());
    }

    #[test]
    fn test_non_finite_inputs_become_zero() {
        let mut data = Dataset::empty();
        data.cost_entries.materials.push(MaterialCostEntry {
            id: RecordId::default(),
            product_id: "p".into(),
            material_id: "m".into(),
            description: None,
            usage_ratio: None,
            cost_per_unit: f64::NAN,
            currency: "JPY".into(),
        });
        data.cost_entries.electricity.push(ElectricityCostEntry {
            id: RecordId::default(),
            product_id: "p".into(),
            cost_per_unit: f64::INFINITY,
            currency: "JPY".into(),
        });
        data.cost_entries.electricity.push(ElectricityCostEntry {
            id: RecordId::default(),
            product_id: "p".into(),
            cost_per_unit: 12.0,
            currency: "JPY".into(),
        });
        let costs = compute_unit_cost("p", &data);
        assert_eq!(costs.material, 0.0);
        assert_eq!(costs.electricity, 12.0);
        assert_eq!(costs.total, 12.0);
    }

    #[test]
    fn test_currencies_are_summed_without_conversion() {
        let mut data = sample();
        data.cost_entries.outsourcing[0].currency = "USD".into();
        let costs = compute_unit_cost("prod-1", &data);
        assert!(close(costs.outsourcing, 120.0));
    }

    #[test]
    fn test_non_negative_for_sample() {
        let costs = compute_unit_cost("prod-1", &sample());
        for (_, value) in costs.components() {
            assert!(value >= 0.0);
        }
        assert!(costs.total >= 0.0);
    }

    #[test]
    fn test_compute_all_follows_product_order() {
        let mut data = sample();
        let mut second = data.products[0].clone();
        second.id = "prod-2".into();
        second.name = "Empty".into();
        data.products.push(second);
        let all = compute_all(&data);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].product_id, "prod-1");
        assert_eq!(all[1].costs, CostBreakdown::default());
        assert_eq!(all[0].costs, compute_unit_cost("prod-1", &data));
    }

    #[test]
    fn test_category_parse_and_order() {
        assert_eq!("Labor".parse::<CostCategory>().unwrap(), CostCategory::Labor);
        assert!("tax".parse::<CostCategory>().is_err());
        let costs = compute_unit_cost("prod-1", &sample());
        let first = costs.components().next().unwrap();
        assert_eq!(first.0, CostCategory::Material);
    }
}
