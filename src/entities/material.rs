//! Material master record - raw stock bought in lots

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, Record};
use crate::core::identity::{RecordId, RecordPrefix};

/// A purchasable material (fabric, leather, resin, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    /// Purchase unit ("m", "kg", "sheet")
    #[serde(default)]
    pub unit: String,

    /// Lot or size description ("50m roll")
    #[serde(default)]
    pub size_description: String,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Cost of one purchase unit
    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub unit_cost: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Material {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            unit: unit.into(),
            size_description: String::new(),
            currency: default_currency(),
            unit_cost,
            supplier: None,
            note: None,
        }
    }

    /// Cost attributed to one product unit consuming `usage_ratio` percent of a lot
    pub fn cost_for_ratio(&self, usage_ratio: f64) -> f64 {
        let unit_cost = if self.unit_cost.is_finite() {
            self.unit_cost
        } else {
            0.0
        };
        unit_cost * (usage_ratio / 100.0)
    }
}

impl Record for Material {
    const PREFIX: RecordPrefix = RecordPrefix::Mat;
    const KIND: &'static str = "material";

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
    fn test_cost_for_ratio() {
        let canvas = Material::new("Canvas", "m", 320.0);
        assert_eq!(canvas.cost_for_ratio(100.0), 320.0);
        assert_eq!(canvas.cost_for_ratio(50.0), 160.0);
        assert_eq!(canvas.cost_for_ratio(0.0), 0.0);
    }

    #[test]
    fn test_parses_camel_case_without_optional_fields() {
        let json = r#"{"id":"mat-9","name":"Thread","unit":"spool","sizeDescription":"","currency":"USD","unitCost":2.5}"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.id, "mat-9");
        assert_eq!(material.currency, "USD");
        assert_eq!(material.unit_cost, 2.5);
        assert!(material.supplier.is_none());

        let out = serde_json::to_string(&material).unwrap();
        assert!(out.contains("\"unitCost\":2.5"));
        assert!(!out.contains("supplier"));
    }
}
