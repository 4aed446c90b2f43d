//! Shipping method master record

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, Record};
use crate::core::identity::{RecordId, RecordPrefix};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingMethod {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Cost of shipping one unit
    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub unit_cost: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ShippingMethod {
    pub fn new(name: impl Into<String>, unit_cost: f64) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            description: None,
            unit_cost,
            currency: default_currency(),
            note: None,
        }
    }
}

impl Record for ShippingMethod {
    const PREFIX: RecordPrefix = RecordPrefix::Shp;
    const KIND: &'static str = "shipping method";

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
