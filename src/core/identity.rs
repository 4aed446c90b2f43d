//! Record identity: opaque string ids with type-prefixed ULID generation

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Record type prefixes used when generating new ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordPrefix {
    /// Material master record
    Mat,
    /// Packaging item master record
    Pkg,
    /// Labor role master record
    Lab,
    /// Equipment master record
    Eqp,
    /// Shipping method master record
    Shp,
    /// Large category
    Catl,
    /// Medium category
    Catm,
    /// Small category
    Cats,
    /// Product
    Prod,
    /// Material cost entry
    Mce,
    /// Packaging cost entry
    Pce,
    /// Labor cost entry
    Lce,
    /// Outsourcing cost entry
    Oce,
    /// Development cost entry
    Dce,
    /// Equipment allocation entry
    Eae,
    /// Logistics cost entry
    Gce,
    /// Electricity cost entry
    Ece,
}

impl RecordPrefix {
    /// Get the string representation of the prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordPrefix::Mat => "MAT",
            RecordPrefix::Pkg => "PKG",
            RecordPrefix::Lab => "LAB",
            RecordPrefix::Eqp => "EQP",
            RecordPrefix::Shp => "SHP",
            RecordPrefix::Catl => "CATL",
            RecordPrefix::Catm => "CATM",
            RecordPrefix::Cats => "CATS",
            RecordPrefix::Prod => "PROD",
            RecordPrefix::Mce => "MCE",
            RecordPrefix::Pce => "PCE",
            RecordPrefix::Lce => "LCE",
            RecordPrefix::Oce => "OCE",
            RecordPrefix::Dce => "DCE",
            RecordPrefix::Eae => "EAE",
            RecordPrefix::Gce => "GCE",
            RecordPrefix::Ece => "ECE",
        }
    }
}

impl fmt::Display for RecordPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque record identifier
///
/// Ids created by this tool look like `MAT-01J...`, but any non-empty string
/// is accepted so snapshots with hand-written ids (`mat-1`) load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a new id with the given prefix
    pub fn new(prefix: RecordPrefix) -> Self {
        Self(format!("{}-{}", prefix.as_str(), Ulid::new()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the placeholder id of a record that has not been stored yet
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdParseError::Whitespace(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for RecordId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for RecordId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Errors from parsing a user-supplied id
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("id must not be empty")]
    Empty,

    #[error("id '{0}' must not contain whitespace")]
    Whitespace(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_has_prefix() {
        let id = RecordId::new(RecordPrefix::Mat);
        assert!(id.as_str().starts_with("MAT-"));
        // 3 prefix chars + dash + 26 ULID chars
        assert_eq!(id.as_str().len(), 30);
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = RecordId::new(RecordPrefix::Prod);
        let b = RecordId::new(RecordPrefix::Prod);
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_accepts_legacy_ids() {
        let id: RecordId = "mat-1".parse().unwrap();
        assert_eq!(id, "mat-1");
        let id: RecordId = "  prod-1 ".parse().unwrap();
        assert_eq!(id.as_str(), "prod-1");
    }

    #[test]
    fn test_parse_rejects_empty_and_whitespace() {
        assert_eq!("".parse::<RecordId>(), Err(IdParseError::Empty));
        assert_eq!("   ".parse::<RecordId>(), Err(IdParseError::Empty));
        assert!(matches!(
            "mat 1".parse::<RecordId>(),
            Err(IdParseError::Whitespace(_))
        ));
    }

    #[test]
    fn test_serde_transparent() {
        let id = RecordId::from("eq-2");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"eq-2\"");
        let parsed: RecordId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
