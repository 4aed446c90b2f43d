//! Record traits - common interface for stored records

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};

/// Currency code used when a record does not carry one
pub const DEFAULT_CURRENCY: &str = "JPY";

pub(crate) fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Read a stored number, treating `null` as 0
///
/// serde_json writes NaN and infinities as `null`, so a snapshot that ever
/// held one must still load.
pub(crate) fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

/// Like [`number_or_zero`], for divisor fields that default to 1
pub(crate) fn number_or_one<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(1.0))
}

/// Common trait for master records, categories and products
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Prefix used when generating ids for this record type
    const PREFIX: RecordPrefix;

    /// Human-readable record kind ("material", "product", ...)
    const KIND: &'static str;

    /// Get the record's unique id
    fn id(&self) -> &RecordId;

    /// Assign the record's id (used when storing a record without one)
    fn set_id(&mut self, id: RecordId);

    /// Get the record's display name
    fn name(&self) -> &str;
}

/// Common trait for per-product cost line items
pub trait CostEntry: Serialize + DeserializeOwned + Clone {
    const PREFIX: RecordPrefix;

    fn id(&self) -> &RecordId;

    fn set_id(&mut self, id: RecordId);

    /// The product this line item is attributed to
    fn product_id(&self) -> &RecordId;

    /// Re-attribute the line item to another product
    fn set_product_id(&mut self, product_id: RecordId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Amounts {
        #[serde(default, deserialize_with = "number_or_zero")]
        cost: f64,
        #[serde(default = "one", deserialize_with = "number_or_one")]
        years: f64,
    }

    fn one() -> f64 {
        1.0
    }

    #[test]
    fn test_null_numbers_fall_back() {
        let a: Amounts = serde_json::from_str(r#"{"cost": null, "years": null}"#).unwrap();
        assert_eq!(a.cost, 0.0);
        assert_eq!(a.years, 1.0);

        let a: Amounts = serde_json::from_str(r#"{"cost": 12.5, "years": 3}"#).unwrap();
        assert_eq!(a.cost, 12.5);
        assert_eq!(a.years, 3.0);

        let a: Amounts = serde_json::from_str("{}").unwrap();
        assert_eq!(a.cost, 0.0);
        assert_eq!(a.years, 1.0);
    }

    #[test]
    fn test_text_is_still_rejected() {
        assert!(serde_json::from_str::<Amounts>(r#"{"cost": "abc"}"#).is_err());
    }
}
