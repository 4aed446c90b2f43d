//! Product categories - a three-level large / medium / small hierarchy
//!
//! Categories are informational only: they group products for display and
//! never take part in cost computation.

use serde::{Deserialize, Serialize};

use crate::core::identity::{RecordId, RecordPrefix};
use crate::core::entity::Record;

/// Category level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryLevel {
    Large,
    Medium,
    Small,
}

impl std::fmt::Display for CategoryLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryLevel::Large => write!(f, "large"),
            CategoryLevel::Medium => write!(f, "medium"),
            CategoryLevel::Small => write!(f, "small"),
        }
    }
}

impl std::str::FromStr for CategoryLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "large" | "l" => Ok(CategoryLevel::Large),
            "medium" | "m" => Ok(CategoryLevel::Medium),
            "small" | "s" => Ok(CategoryLevel::Small),
            _ => Err(format!(
                "Invalid category level: {}. Use large, medium, or small",
                s
            )),
        }
    }
}

/// Top-level category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLarge {
    #[serde(default)]
    pub id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Second-level category, child of a large category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryMedium {
    #[serde(default)]
    pub id: RecordId,

    pub large_id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Third-level category, child of a medium category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySmall {
    #[serde(default)]
    pub id: RecordId,

    pub medium_id: RecordId,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for CategoryLarge {
    const PREFIX: RecordPrefix = RecordPrefix::Catl;
    const KIND: &'static str = "large category";

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

impl Record for CategoryMedium {
    const PREFIX: RecordPrefix = RecordPrefix::Catm;
    const KIND: &'static str = "medium category";

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

impl Record for CategorySmall {
    const PREFIX: RecordPrefix = RecordPrefix::Cats;
    const KIND: &'static str = "small category";

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

/// All three category levels as stored in the snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categories {
    #[serde(default)]
    pub large: Vec<CategoryLarge>,

    #[serde(default)]
    pub medium: Vec<CategoryMedium>,

    #[serde(default)]
    pub small: Vec<CategorySmall>,
}

impl Categories {
    pub fn large(&self, id: &str) -> Option<&CategoryLarge> {
        self.large.iter().find(|c| c.id == id)
    }

    pub fn medium(&self, id: &str) -> Option<&CategoryMedium> {
        self.medium.iter().find(|c| c.id == id)
    }

    pub fn small(&self, id: &str) -> Option<&CategorySmall> {
        self.small.iter().find(|c| c.id == id)
    }

    /// Medium categories under a large category, in stored order
    pub fn children_of_large<'a>(&'a self, large_id: &'a str) -> impl Iterator<Item = &'a CategoryMedium> {
        self.medium.iter().filter(move |c| c.large_id == large_id)
    }

    /// Small categories under a medium category, in stored order
    pub fn children_of_medium<'a>(&'a self, medium_id: &'a str) -> impl Iterator<Item = &'a CategorySmall> {
        self.small.iter().filter(move |c| c.medium_id == medium_id)
    }

    pub fn len(&self) -> usize {
        self.large.len() + self.medium.len() + self.small.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
