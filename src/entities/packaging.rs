//! Packaging item master record

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, Record};
use crate::core::identity::{RecordId, RecordPrefix};

/// Boxes, bags, cushioning and other per-shipment packaging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagingItem {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    pub size_description: String,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub unit_cost: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl PackagingItem {
    pub fn new(name: impl Into<String>, unit: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            unit: unit.into(),
            size_description: String::new(),
            unit_cost,
            currency: default_currency(),
            note: None,
        }
    }
}

impl Record for PackagingItem {
    const PREFIX: RecordPrefix = RecordPrefix::Pkg;
    const KIND: &'static str = "packaging item";

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
