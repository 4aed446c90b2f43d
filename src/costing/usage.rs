//! Material and equipment usage across all products
//!
//! These groupings back the summary views: one group per master record,
//! listing every cost entry that draws on it.

use serde::Serialize;

use crate::core::dataset::{Dataset, UNASSIGNED};
use crate::core::identity::RecordId;
use crate::core::money::{divisor, finite_or_zero};
use crate::entities::Equipment;

/// One product's draw on a material
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialUsageLine {
    pub product_name: String,
    pub usage_ratio: Option<f64>,
    pub cost_share: f64,
    pub lot_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialUsageGroup {
    pub material_id: RecordId,
    pub material_name: String,
    pub unit: String,
    pub supplier: Option<String>,
    /// Currency of the last entry in the group
    pub currency: String,
    pub base_unit_cost: f64,
    /// Sum of the ratios that were recorded, `None` when no entry has one
    pub total_usage_ratio: Option<f64>,
    pub entries: Vec<MaterialUsageLine>,
}

/// Group material cost entries by material, in first-appearance order
///
/// Entries pointing at an unknown material are left out.
pub fn material_usage_groups(data: &Dataset) -> Vec<MaterialUsageGroup> {
    let mut groups: Vec<MaterialUsageGroup> = Vec::new();

    for entry in &data.cost_entries.materials {
        let Some(material) = data.find_material(entry.material_id.as_str()) else {
            continue;
        };
        let product = data.find_product(entry.product_id.as_str());

        let position = match groups.iter().position(|g| g.material_id == material.id) {
            Some(i) => i,
            None => {
                groups.push(MaterialUsageGroup {
                    material_id: material.id.clone(),
                    material_name: material.name.clone(),
                    unit: material.unit.clone(),
                    supplier: material.supplier.clone(),
                    currency: material.currency.clone(),
                    base_unit_cost: material.unit_cost,
                    total_usage_ratio: None,
                    entries: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];

        group.currency = entry.currency.clone();
        if let Some(ratio) = entry.usage_ratio {
            group.total_usage_ratio = Some(group.total_usage_ratio.unwrap_or(0.0) + ratio);
        }
        group.entries.push(MaterialUsageLine {
            product_name: product
                .map(|p| p.name.clone())
                .unwrap_or_else(|| UNASSIGNED.to_string()),
            usage_ratio: entry.usage_ratio,
            cost_share: entry.cost_per_unit,
            lot_size: product.map(|p| p.production_lot_size),
        });
    }

    groups
}

/// One product's allocation of an equipment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentUsageLine {
    pub product_name: String,
    pub allocation_ratio: f64,
    pub annual_quantity: f64,
    pub usage_hours: Option<f64>,
    /// Unit cost from the stored allocation ratio
    pub unit_cost: f64,
    /// Share shown to the user: hours share when known, else the stored ratio
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentUsageGroup {
    pub equipment: Equipment,
    /// `None` when no entry in the group recorded hours
    pub total_usage_hours: Option<f64>,
    pub entries: Vec<EquipmentUsageLine>,
}

/// Group equipment allocations by equipment, in first-appearance order
///
/// Hours are summed across every product using the equipment, unlike the
/// per-product grouping used for unit costs.
pub fn equipment_usage_groups(data: &Dataset) -> Vec<EquipmentUsageGroup> {
    let mut groups: Vec<EquipmentUsageGroup> = Vec::new();

    for entry in &data.cost_entries.equipment_allocations {
        let Some(equipment) = data.find_equipment(entry.equipment_id.as_str()) else {
            continue;
        };
        let product_name = data.product_name(entry.product_id.as_str());
        let annual_quantity = divisor(finite_or_zero(entry.annual_quantity));
        let unit_cost =
            finite_or_zero(equipment.annual_cost() * entry.allocation_ratio / annual_quantity);

        let position = match groups.iter().position(|g| g.equipment.id == equipment.id) {
            Some(i) => i,
            None => {
                groups.push(EquipmentUsageGroup {
                    equipment: equipment.clone(),
                    total_usage_hours: None,
                    entries: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[position];

        if let Some(hours) = entry.usage_hours {
            group.total_usage_hours = Some(group.total_usage_hours.unwrap_or(0.0) + hours);
        }
        group.entries.push(EquipmentUsageLine {
            product_name,
            allocation_ratio: entry.allocation_ratio,
            annual_quantity: entry.annual_quantity,
            usage_hours: entry.usage_hours,
            unit_cost,
            share: entry.allocation_ratio,
        });
    }

    // Shares need the final group total
    for group in &mut groups {
        let total = group.total_usage_hours.unwrap_or(0.0);
        for line in &mut group.entries {
            if let (Some(hours), true) = (line.usage_hours, total > 0.0) {
                line.share = finite_or_zero(hours / total);
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EquipmentAllocationEntry, MaterialCostEntry};

    #[test]
    fn test_material_groups_for_sample() {
        let groups = material_usage_groups(&Dataset::sample());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].material_id, "mat-1");
        assert_eq!(groups[0].total_usage_ratio, Some(80.0));
        assert_eq!(groups[0].entries[0].cost_share, 350.0);
        assert_eq!(groups[0].entries[0].lot_size, Some(50.0));
        assert_eq!(groups[1].base_unit_cost, 450.0);
    }

    #[test]
    fn test_material_group_ratio_none_and_unknown_skipped() {
        let mut data = Dataset::sample();
        for entry in &mut data.cost_entries.materials {
            entry.usage_ratio = None;
        }
        data.cost_entries.materials.push(MaterialCostEntry {
            id: RecordId::default(),
            product_id: "gone".into(),
            material_id: "mat-1".into(),
            description: None,
            usage_ratio: Some(5.0),
            cost_per_unit: 16.0,
            currency: "USD".into(),
        });
        data.cost_entries.materials.push(MaterialCostEntry {
            id: RecordId::default(),
            product_id: "prod-1".into(),
            material_id: "unknown".into(),
            description: None,
            usage_ratio: None,
            cost_per_unit: 1.0,
            currency: "JPY".into(),
        });

        let groups = material_usage_groups(&data);
        assert_eq!(groups.len(), 2);
        let canvas = &groups[0];
        assert_eq!(canvas.entries.len(), 2);
        assert_eq!(canvas.total_usage_ratio, Some(5.0));
        assert_eq!(canvas.currency, "USD");
        assert_eq!(canvas.entries[1].product_name, UNASSIGNED);
        assert_eq!(canvas.entries[1].lot_size, None);
        assert_eq!(groups[1].total_usage_ratio, None);
    }

    #[test]
    fn test_equipment_groups_for_sample() {
        let groups = equipment_usage_groups(&Dataset::sample());
        assert_eq!(groups.len(), 2);
        let sewing = &groups[0];
        assert_eq!(sewing.total_usage_hours, Some(0.6));
        // stored ratio: 80000 × 0.5 / 3000
        assert!((sewing.entries[0].unit_cost - 40_000.0 / 3000.0).abs() < 1e-9);
        assert!((sewing.entries[0].share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_equipment_share_across_products() {
        let mut data = Dataset::sample();
        data.cost_entries.equipment_allocations.push(EquipmentAllocationEntry {
            id: RecordId::default(),
            product_id: "prod-x".into(),
            equipment_id: "eq-1".into(),
            allocation_ratio: 0.2,
            annual_quantity: 0.0,
            usage_hours: Some(1.4),
        });
        data.cost_entries.equipment_allocations.push(EquipmentAllocationEntry {
            id: RecordId::default(),
            product_id: "prod-y".into(),
            equipment_id: "eq-1".into(),
            allocation_ratio: 0.25,
            annual_quantity: 100.0,
            usage_hours: None,
        });

        let groups = equipment_usage_groups(&data);
        let sewing = &groups[0];
        assert_eq!(sewing.entries.len(), 3);
        assert!((sewing.total_usage_hours.unwrap() - 2.0).abs() < 1e-9);
        assert!((sewing.entries[0].share - 0.3).abs() < 1e-9);
        assert!((sewing.entries[1].share - 0.7).abs() < 1e-9);
        assert_eq!(sewing.entries[2].share, 0.25);
        // annual quantity 0 divides by 1
        assert!((sewing.entries[1].unit_cost - 16_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_equipment_groups_skip_unknown_equipment() {
        let mut data = Dataset::sample();
        data.equipments.clear();
        assert!(equipment_usage_groups(&data).is_empty());
    }
}
