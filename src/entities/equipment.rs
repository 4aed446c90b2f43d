//! Equipment master record - machines amortized over years

use serde::{Deserialize, Serialize};

use crate::core::entity::{default_currency, Record};
use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::money::divisor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default, deserialize_with = "crate::core::entity::number_or_zero")]
    pub acquisition_cost: f64,

    #[serde(default = "default_currency")]
    pub currency: String,

    /// Amortization period in years (floored to 1 when used as a divisor)
    #[serde(default = "default_amortization_years", deserialize_with = "crate::core::entity::number_or_one")]
    pub amortization_years: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_amortization_years() -> f64 {
    1.0
}

impl Equipment {
    pub fn new(name: impl Into<String>, acquisition_cost: f64, amortization_years: f64) -> Self {
        Self {
            id: RecordId::default(),
            name: name.into(),
            acquisition_cost,
            currency: default_currency(),
            amortization_years,
            note: None,
        }
    }

    /// Acquisition cost spread evenly over the amortization period
    pub fn annual_cost(&self) -> f64 {
        self.acquisition_cost / divisor(self.amortization_years)
    }
}

impl Record for Equipment {
    const PREFIX: RecordPrefix = RecordPrefix::Eqp;
    const KIND: &'static str = "equipment";

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
    fn test_annual_cost() {
        let sewing = Equipment::new("Industrial sewing machine", 400_000.0, 5.0);
        assert_eq!(sewing.annual_cost(), 80_000.0);
    }

    #[test]
    fn test_annual_cost_floors_period() {
        let zero = Equipment::new("Press", 120_000.0, 0.0);
        assert_eq!(zero.annual_cost(), 120_000.0);

        let negative = Equipment::new("Press", 120_000.0, -3.0);
        assert_eq!(negative.annual_cost(), 120_000.0);

        let nan = Equipment::new("Press", 120_000.0, f64::NAN);
        assert_eq!(nan.annual_cost(), 120_000.0);
    }
}
