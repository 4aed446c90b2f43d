//! The dataset snapshot - every master record, product and cost entry
//!
//! A [`Dataset`] is a plain value owned by whoever loaded it. Costing code
//! only ever borrows it; mutations here are list append / replace / remove
//! keyed by record id.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::entity::Record;
use crate::core::identity::RecordId;
use crate::entities::{
    Categories, CategoryLarge, CategoryMedium, CategorySmall, CostBatch, CostEntries,
    DevelopmentCostEntry, ElectricityCostEntry, Equipment, EquipmentAllocationEntry, LaborCostEntry,
    LaborRole, LogisticsCostEntry, Material, MaterialCostEntry, OutsourcingCostEntry,
    PackagingCostEntry, PackagingItem, Product, ShippingMethod,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("{kind} '{id}' already exists")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} parent '{id}' not found")]
    UnknownParent { kind: &'static str, id: String },
}

/// Full in-memory state: master data, products and cost entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub categories: Categories,

    #[serde(default)]
    pub materials: Vec<Material>,

    #[serde(default)]
    pub packaging_items: Vec<PackagingItem>,

    #[serde(default)]
    pub shipping_methods: Vec<ShippingMethod>,

    #[serde(default)]
    pub labor_roles: Vec<LaborRole>,

    #[serde(default)]
    pub equipments: Vec<Equipment>,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub cost_entries: CostEntries,
}

/// Borrowed view of the cost entries attributed to one product
#[derive(Debug, Default)]
pub struct ProductEntries<'a> {
    pub materials: Vec<&'a MaterialCostEntry>,
    pub packaging: Vec<&'a PackagingCostEntry>,
    pub labor: Vec<&'a LaborCostEntry>,
    pub outsourcing: Vec<&'a OutsourcingCostEntry>,
    pub development: Vec<&'a DevelopmentCostEntry>,
    pub equipment_allocations: Vec<&'a EquipmentAllocationEntry>,
    pub logistics: Vec<&'a LogisticsCostEntry>,
    pub electricity: Vec<&'a ElectricityCostEntry>,
}

impl ProductEntries<'_> {
    pub fn len(&self) -> usize {
        self.materials.len()
            + self.packaging.len()
            + self.labor.len()
            + self.outsourcing.len()
            + self.development.len()
            + self.equipment_allocations.len()
            + self.logistics.len()
            + self.electricity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append a record, generating an id when it has none
pub fn insert<T: Record>(records: &mut Vec<T>, mut record: T) -> Result<RecordId, DatasetError> {
    if record.id().is_empty() {
        record.set_id(RecordId::new(T::PREFIX));
    } else if records.iter().any(|r| r.id() == record.id()) {
        return Err(DatasetError::DuplicateId {
            kind: T::KIND,
            id: record.id().to_string(),
        });
    }
    let id = record.id().clone();
    records.push(record);
    Ok(id)
}

/// Replace the record with the same id, keeping its position
pub fn replace<T: Record>(records: &mut [T], record: T) -> Result<(), DatasetError> {
    match records.iter_mut().find(|r| r.id() == record.id()) {
        Some(slot) => {
            *slot = record;
            Ok(())
        }
        None => Err(DatasetError::NotFound {
            kind: T::KIND,
            id: record.id().to_string(),
        }),
    }
}

pub fn find<'a, T: Record>(records: &'a [T], id: &str) -> Option<&'a T> {
    records.iter().find(|r| r.id() == id)
}

/// Find by exact id, then by case-insensitive name
pub fn resolve<'a, T: Record>(records: &'a [T], query: &str) -> Option<&'a T> {
    let query = query.trim();
    find(records, query).or_else(|| {
        let lower = query.to_lowercase();
        records.iter().find(|r| r.name().to_lowercase() == lower)
    })
}

fn entries_of<'a, E: crate::core::entity::CostEntry>(entries: &'a [E], product_id: &str) -> Vec<&'a E> {
    entries.iter().filter(|e| e.product_id() == product_id).collect()
}

impl Dataset {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn find_product(&self, id: &str) -> Option<&Product> {
        find(&self.products, id)
    }

    pub fn find_material(&self, id: &str) -> Option<&Material> {
        find(&self.materials, id)
    }

    pub fn find_packaging_item(&self, id: &str) -> Option<&PackagingItem> {
        find(&self.packaging_items, id)
    }

    pub fn find_labor_role(&self, id: &str) -> Option<&LaborRole> {
        find(&self.labor_roles, id)
    }

    pub fn find_equipment(&self, id: &str) -> Option<&Equipment> {
        find(&self.equipments, id)
    }

    pub fn find_shipping_method(&self, id: &str) -> Option<&ShippingMethod> {
        find(&self.shipping_methods, id)
    }

    /// Product display name, or a placeholder for dangling references
    pub fn product_name(&self, id: &str) -> String {
        self.find_product(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNASSIGNED.to_string())
    }

    pub fn add_large_category(&mut self, category: CategoryLarge) -> Result<RecordId, DatasetError> {
        insert(&mut self.categories.large, category)
    }

    pub fn add_medium_category(&mut self, category: CategoryMedium) -> Result<RecordId, DatasetError> {
        if self.categories.large(category.large_id.as_str()).is_none() {
            return Err(DatasetError::UnknownParent {
                kind: CategoryMedium::KIND,
                id: category.large_id.to_string(),
            });
        }
        insert(&mut self.categories.medium, category)
    }

    pub fn add_small_category(&mut self, category: CategorySmall) -> Result<RecordId, DatasetError> {
        if self.categories.medium(category.medium_id.as_str()).is_none() {
            return Err(DatasetError::UnknownParent {
                kind: CategorySmall::KIND,
                id: category.medium_id.to_string(),
            });
        }
        insert(&mut self.categories.small, category)
    }

    pub fn update_large_category(&mut self, category: CategoryLarge) -> Result<(), DatasetError> {
        replace(&mut self.categories.large, category)
    }

    /// Replace a medium category; a changed parent must exist
    pub fn update_medium_category(&mut self, category: CategoryMedium) -> Result<(), DatasetError> {
        if self.categories.large(category.large_id.as_str()).is_none() {
            return Err(DatasetError::UnknownParent {
                kind: CategoryMedium::KIND,
                id: category.large_id.to_string(),
            });
        }
        replace(&mut self.categories.medium, category)
    }

    pub fn update_small_category(&mut self, category: CategorySmall) -> Result<(), DatasetError> {
        if self.categories.medium(category.medium_id.as_str()).is_none() {
            return Err(DatasetError::UnknownParent {
                kind: CategorySmall::KIND,
                id: category.medium_id.to_string(),
            });
        }
        replace(&mut self.categories.small, category)
    }

    /// Cost entries attributed to `product_id`, whether or not the product exists
    pub fn entries_for(&self, product_id: &str) -> ProductEntries<'_> {
        let entries = &self.cost_entries;
        ProductEntries {
            materials: entries_of(&entries.materials, product_id),
            packaging: entries_of(&entries.packaging, product_id),
            labor: entries_of(&entries.labor, product_id),
            outsourcing: entries_of(&entries.outsourcing, product_id),
            development: entries_of(&entries.development, product_id),
            equipment_allocations: entries_of(&entries.equipment_allocations, product_id),
            logistics: entries_of(&entries.logistics, product_id),
            electricity: entries_of(&entries.electricity, product_id),
        }
    }

    /// Remove every entry for the product, then append `batch` in its place
    pub fn replace_cost_batch(&mut self, product_id: &RecordId, batch: CostBatch) {
        self.cost_entries.remove_product(product_id.as_str());
        self.cost_entries.append_batch(product_id, batch);
    }

    /// Store a submitted product together with its cost batch
    ///
    /// An existing product with the same id is replaced in place and its
    /// previous batch discarded; otherwise the product is appended.
    pub fn upsert_product(&mut self, mut product: Product, batch: CostBatch) -> RecordId {
        if product.id.is_empty() {
            product.set_id(RecordId::new(Product::PREFIX));
        }
        let id = product.id.clone();
        match self.products.iter_mut().find(|p| p.id == id) {
            Some(slot) => *slot = product,
            None => self.products.push(product),
        }
        self.replace_cost_batch(&id, batch);
        id
    }

    /// Remove a product and cascade to its cost entries
    ///
    /// Returns the number of cost entries removed, or `None` when neither the
    /// product nor any entry for it existed.
    pub fn remove_product(&mut self, product_id: &str) -> Option<usize> {
        let before = self.products.len();
        self.products.retain(|p| p.id != product_id);
        let removed_product = self.products.len() != before;
        let removed_entries = self.cost_entries.remove_product(product_id);
        if removed_product || removed_entries > 0 {
            Some(removed_entries)
        } else {
            None
        }
    }

    /// Number of master records (materials, packaging, labor, equipment, shipping)
    pub fn master_count(&self) -> usize {
        self.materials.len()
            + self.packaging_items.len()
            + self.labor_roles.len()
            + self.equipments.len()
            + self.shipping_methods.len()
    }

    pub fn cost_entry_count(&self) -> usize {
        self.cost_entries.len()
    }

    /// "Large / Medium / Small" built from the categories that resolve
    pub fn category_path(&self, product: &Product) -> Option<String> {
        let cats = &self.categories;
        let parts: Vec<&str> = [
            product
                .category_large_id
                .as_ref()
                .and_then(|id| cats.large(id.as_str()))
                .map(|c| c.name.as_str()),
            product
                .category_medium_id
                .as_ref()
                .and_then(|id| cats.medium(id.as_str()))
                .map(|c| c.name.as_str()),
            product
                .category_small_id
                .as_ref()
                .and_then(|id| cats.small(id.as_str()))
                .map(|c| c.name.as_str()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

/// Placeholder name for entries whose product no longer exists
pub const UNASSIGNED: &str = "(unassigned)";
