//! Product entity - the unit whose cost is being computed

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::core::entity::Record;
use crate::core::money::divisor;
use crate::core::identity::{RecordId, RecordPrefix};

/// A named size or option variant ("S: 1500 units")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeVariant {
    pub label: String,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub quantity: f64,
}

/// Expected production volume used to amortize one-off costs
///
/// Both fields are divisors and are kept at 1 or above by [`normalized`](Self::normalized).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedProduction {
    #[serde(default = "one", deserialize_with = "crate::core::entity::number_or_one")]
    pub period_years: f64,

    #[serde(default = "one", deserialize_with = "crate::core::entity::number_or_one")]
    pub quantity: f64,
}

fn one() -> f64 {
    1.0
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

impl Default for ExpectedProduction {
    fn default() -> Self {
        Self {
            period_years: 1.0,
            quantity: 1.0,
        }
    }
}

impl ExpectedProduction {
    pub fn new(period_years: f64, quantity: f64) -> Self {
        Self {
            period_years,
            quantity,
        }
        .normalized()
    }

    /// Replace non-positive or non-finite values with 1
    pub fn normalized(self) -> Self {
        Self {
            period_years: positive_or_one(self.period_years),
            quantity: positive_or_one(self.quantity),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_large_id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_medium_id: Option<RecordId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_small_id: Option<RecordId>,

    #[serde(default)]
    pub size_variants: Vec<SizeVariant>,

    /// Standard labor hours per unit, used as the default for new labor lines
    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub base_man_hours: f64,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub default_electricity_cost: f64,

    #[serde(default = "today")]
    pub registered_at: NaiveDate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default = "default_lot_size", deserialize_with = "crate::core::entity::number_or_one")]
    pub production_lot_size: f64,

    #[serde(default)]
    pub expected_production: ExpectedProduction,

    #[serde(default)]
    pub equipment_ids: Vec<RecordId>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn default_lot_size() -> f64 {
    1.0
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            category_large_id: None,
            category_medium_id: None,
            category_small_id: None,
            size_variants: Vec::new(),
            base_man_hours: 0.0,
            default_electricity_cost: 0.0,
            registered_at: today(),
            notes: None,
            production_lot_size: 1.0,
            expected_production: ExpectedProduction::default(),
            equipment_ids: Vec::new(),
        }
    }

    /// Expected production quantity as a divisor: 1 when missing, zero or negative
    pub fn quantity_divisor(&self) -> f64 {
        divisor(self.expected_production.quantity)
    }

    /// "S: 1500 / M: 1500" style summary of the labelled variants
    pub fn variant_summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .size_variants
            .iter()
            .filter(|v| !v.label.trim().is_empty())
            .map(|v| format!("{}: {}", v.label.trim(), v.quantity))
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

impl Record for Product {
    const PREFIX: RecordPrefix = RecordPrefix::Prod;
    const KIND: &'static str = "product";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_production_normalization() {
        let p = ExpectedProduction::new(0.0, -20.0);
        assert_eq!(p.period_years, 1.0);
        assert_eq!(p.quantity, 1.0);

        let p = ExpectedProduction::new(2.0, 3000.0);
        assert_eq!(p.period_years, 2.0);
        assert_eq!(p.quantity, 3000.0);

        let p = ExpectedProduction {
            period_years: f64::NAN,
            quantity: f64::INFINITY,
        }
        .normalized();
        assert_eq!(p, ExpectedProduction::default());
    }

    #[test]
    fn test_quantity_divisor_guards() {
        let mut product = Product::new("Tote");
        product.expected_production.quantity = 0.0;
        assert_eq!(product.quantity_divisor(), 1.0);
        product.expected_production.quantity = -5.0;
        assert_eq!(product.quantity_divisor(), 1.0);
        product.expected_production.quantity = 0.5;
        assert_eq!(product.quantity_divisor(), 1.0);
        product.expected_production.quantity = 3000.0;
        assert_eq!(product.quantity_divisor(), 3000.0);
    }

    #[test]
    fn test_variant_summary_skips_blank_labels() {
        let mut product = Product::new("Tote");
        assert_eq!(product.variant_summary(), None);
        product.size_variants = vec![
            SizeVariant {
                label: "S".into(),
                quantity: 1500.0,
            },
            SizeVariant {
                label: "  ".into(),
                quantity: 3.0,
            },
            SizeVariant {
                label: "M".into(),
                quantity: 1500.0,
            },
        ];
        assert_eq!(product.variant_summary().as_deref(), Some("S: 1500 / M: 1500"));
    }

    #[test]
    fn test_parses_snapshot_product() {
        let json = r#"{
            "id": "prod-1",
            "name": "Daily mini tote",
            "categoryLargeId": "cat-l-1",
            "sizeVariants": [{"label": "S", "quantity": 1500}],
            "baseManHours": 1.5,
            "defaultElectricityCost": 25,
            "registeredAt": "2024-05-01",
            "productionLotSize": 50,
            "expectedProduction": {"periodYears": 1, "quantity": 3000},
            "equipmentIds": ["eq-1", "eq-2"]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, "prod-1");
        assert_eq!(product.registered_at, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(product.expected_production.quantity, 3000.0);
        assert_eq!(product.equipment_ids.len(), 2);
        assert!(product.category_medium_id.is_none());
    }
}
