//! Labor role master record

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, Record};
use crate::core::identity::{RecordId, RecordPrefix};

/// A kind of work (cutting, sewing, finishing) with its hourly rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborRole {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub hourly_rate: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl LaborRole {
    pub fn new(name: impl Into<String>, hourly_rate: f64) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            hourly_rate,
            currency: default_currency(),
            note: None,
        }
    }
}

impl Record for LaborRole {
    const PREFIX: RecordPrefix = RecordPrefix::Lab;
    const KIND: &'static str = "labor role";

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
