//! Per-entry cost lines for listing
//!
//! One [`CostLine`] per cost entry, using the same per-unit amounts as
//! [`compute_unit_cost`](super::compute_unit_cost). For a single product the
//! line amounts of a category add up to that category's breakdown value.

use serde::Serialize;

use crate::core::dataset::Dataset;
use crate::core::entity::{default_currency, CostEntry};
use crate::core::identity::RecordId;
use crate::core::money::finite_or_zero;

use super::aggregator::{
    development_unit_cost, equipment_unit_cost, labor_unit_cost, quantity_divisor,
    total_usage_hours, CostCategory, MasterIndex,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostLine {
    pub entry_id: RecordId,
    pub category: CostCategory,
    pub product_id: RecordId,
    pub product_name: String,
    pub detail: String,
    pub amount: f64,
    pub currency: String,
}

fn keep<E: CostEntry>(entry: &E, product: Option<&str>) -> bool {
    product.map_or(true, |id| entry.product_id() == id)
}

fn or_dash(name: Option<&str>) -> String {
    name.unwrap_or("-").to_string()
}

/// Cost lines for every entry, or only those of `product`
///
/// Lines are grouped by category in breakdown order, then in entry order.
pub fn cost_lines(data: &Dataset, product: Option<&str>) -> Vec<CostLine> {
    let index = MasterIndex::new(data);
    let entries = &data.cost_entries;
    let mut lines = Vec::new();

    let mut push = |entry_id: &RecordId,
                    category: CostCategory,
                    product_id: &RecordId,
                    detail: String,
                    amount: f64,
                    currency: &str| {
        lines.push(CostLine {
            entry_id: entry_id.clone(),
            category,
            product_id: product_id.clone(),
            product_name: data.product_name(product_id.as_str()),
            detail,
            amount: finite_or_zero(amount),
            currency: currency.to_string(),
        });
    };

    for e in entries.materials.iter().filter(|e| keep(*e, product)) {
        let material = data.find_material(e.material_id.as_str());
        let mut detail = or_dash(material.map(|m| m.name.as_str()));
        if let Some(ratio) = e.usage_ratio {
            detail.push_str(&format!(" / {}%", ratio));
        }
        if let Some(description) = e.description.as_deref().filter(|d| !d.trim().is_empty()) {
            detail.push_str(&format!(" ({})", description.trim()));
        }
        push(&e.id, CostCategory::Material, &e.product_id, detail, e.cost_per_unit, &e.currency);
    }

    for e in entries.packaging.iter().filter(|e| keep(*e, product)) {
        let item = data.find_packaging_item(e.packaging_item_id.as_str());
        let detail = format!("{} × {}", or_dash(item.map(|i| i.name.as_str())), e.quantity);
        push(
            &e.id,
            CostCategory::Packaging,
            &e.product_id,
            detail,
            e.quantity * e.cost_per_unit,
            &e.currency,
        );
    }

    for e in entries.labor.iter().filter(|e| keep(*e, product)) {
        let role = index.labor_role(e.labor_role_id.as_str());
        let detail = format!(
            "{} / {}h × {}",
            or_dash(role.map(|r| r.name.as_str())),
            e.hours,
            e.people_count
        );
        let currency = role.map(|r| r.currency.clone()).unwrap_or_else(default_currency);
        push(&e.id, CostCategory::Labor, &e.product_id, detail, labor_unit_cost(e, role), &currency);
    }

    for e in entries.outsourcing.iter().filter(|e| keep(*e, product)) {
        let detail = or_dash(e.note.as_deref().filter(|n| !n.trim().is_empty()));
        push(&e.id, CostCategory::Outsourcing, &e.product_id, detail, e.cost_per_unit, &e.currency);
    }

    for e in entries.development.iter().filter(|e| keep(*e, product)) {
        let quantity = quantity_divisor(data.find_product(e.product_id.as_str()));
        let detail = format!(
            "{} / {}y / {} units",
            e.display_title(),
            e.amortization_years,
            quantity
        );
        push(
            &e.id,
            CostCategory::Development,
            &e.product_id,
            detail,
            development_unit_cost(e, quantity),
            &default_currency(),
        );
    }

    for e in entries.equipment_allocations.iter().filter(|e| keep(*e, product)) {
        let product_id = e.product_id.as_str();
        let group_hours = total_usage_hours(
            entries
                .equipment_allocations
                .iter()
                .filter(|other| other.product_id == product_id),
        );
        let quantity = quantity_divisor(data.find_product(product_id));
        let equipment = index.equipment(e.equipment_id.as_str());
        let amount = equipment
            .map(|eq| equipment_unit_cost(e, eq, group_hours, quantity))
            .unwrap_or(0.0);
        let mut detail = or_dash(equipment.map(|eq| eq.name.as_str()));
        match e.usage_hours {
            Some(hours) => detail.push_str(&format!(" / {:.2}h", hours)),
            None => detail.push_str(&format!(" / {}%", (e.allocation_ratio * 100.0).round())),
        }
        let currency = equipment.map(|eq| eq.currency.clone()).unwrap_or_else(default_currency);
        push(&e.id, CostCategory::Equipment, &e.product_id, detail, amount, &currency);
    }

    for e in entries.logistics.iter().filter(|e| keep(*e, product)) {
        let method = data.find_shipping_method(e.shipping_method_id.as_str());
        let detail = or_dash(method.map(|m| m.name.as_str()));
        push(&e.id, CostCategory::Logistics, &e.product_id, detail, e.cost_per_unit, &e.currency);
    }

    for e in entries.electricity.iter().filter(|e| keep(*e, product)) {
        push(
            &e.id,
            CostCategory::Electricity,
            &e.product_id,
            "Electricity".to_string(),
            e.cost_per_unit,
            &e.currency,
        );
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::compute_unit_cost;

    #[test]
    fn test_lines_sum_to_breakdown() {
        let data = Dataset::sample();
        let lines = cost_lines(&data, Some("prod-1"));
        assert_eq!(lines.len(), data.cost_entry_count());

        let costs = compute_unit_cost("prod-1", &data);
        for (category, value) in costs.components() {
            let sum: f64 = lines
                .iter()
                .filter(|l| l.category == category)
                .map(|l| l.amount)
                .sum();
            assert!((sum - value).abs() < 1e-9, "{} lines sum {} != {}", category, sum, value);
        }
    }

    #[test]
    fn test_lines_filter_by_product() {
        let data = Dataset::sample();
        assert!(cost_lines(&data, Some("other")).is_empty());
        assert_eq!(cost_lines(&data, None).len(), 12);
    }

    #[test]
    fn test_line_details() {
        let data = Dataset::sample();
        let lines = cost_lines(&data, None);
        let packaging = lines
            .iter()
            .find(|l| l.category == CostCategory::Packaging)
            .unwrap();
        assert_eq!(packaging.detail, "段ボール S × 1");
        let labor = lines.iter().find(|l| l.category == CostCategory::Labor).unwrap();
        assert_eq!(labor.detail, "裁断 / 0.4h × 1");
        assert_eq!(labor.amount, 720.0);
        let development = lines
            .iter()
            .find(|l| l.category == CostCategory::Development)
            .unwrap();
        assert_eq!(development.detail, "初期試作 / 2y / 3000 units");
    }

    #[test]
    fn test_dangling_references_show_dash() {
        let mut data = Dataset::sample();
        data.labor_roles.clear();
        data.products.clear();
        let lines = cost_lines(&data, None);
        let labor = lines.iter().find(|l| l.category == CostCategory::Labor).unwrap();
        assert!(labor.detail.starts_with("- /"));
        assert_eq!(labor.amount, 0.0);
        assert_eq!(labor.currency, "JPY");
        assert_eq!(labor.product_name, crate::core::dataset::UNASSIGNED);
    }
}
