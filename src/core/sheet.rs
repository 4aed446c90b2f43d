//! Product sheets - the editable form behind `product apply`
//!
//! A [`ProductSheet`] is a YAML document describing one product together
//! with its cost lines in form terms: references to master records plus the
//! quantities a user types in. [`ProductSheet::submit`] turns it into a
//! [`Product`] and the [`CostBatch`] stored with it, fixing the per-unit
//! amounts from the current master data.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::dataset::Dataset;
use crate::core::entity::default_currency;
use crate::core::identity::RecordId;
use crate::core::money::finite_or_zero;
use crate::entities::{
    CostBatch, DevelopmentCostEntry, ElectricityCostEntry, EquipmentAllocationEntry,
    ExpectedProduction, LaborCostEntry, LogisticsCostEntry, MaterialCostEntry,
    OutsourcingCostEntry, PackagingCostEntry, Product, SizeVariant,
};

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("product name is required")]
    MissingName,

    #[error("invalid product sheet: {0}")]
    Parse(#[from] serde_yml::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialLine {
    pub material: RecordId,
    /// Percent of the material's unit cost consumed per unit
    pub usage_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for MaterialLine {
    fn default() -> Self {
        Self {
            material: RecordId::default(),
            usage_ratio: 100.0,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagingLine {
    pub item: RecordId,
    pub quantity: f64,
}

impl Default for PackagingLine {
    fn default() -> Self {
        Self {
            item: RecordId::default(),
            quantity: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborLine {
    pub role: RecordId,
    pub hours: f64,
    pub people: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate_override: Option<f64>,
}

impl Default for LaborLine {
    fn default() -> Self {
        Self {
            role: RecordId::default(),
            hours: 1.0,
            people: 1.0,
            hourly_rate_override: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutsourcingLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub cost_per_unit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevelopmentLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub prototype_labor_cost: f64,
    pub prototype_material_cost: f64,
    pub tooling_cost: f64,
    pub amortization_years: f64,
}

impl Default for DevelopmentLine {
    fn default() -> Self {
        Self {
            title: None,
            prototype_labor_cost: 0.0,
            prototype_material_cost: 0.0,
            tooling_cost: 0.0,
            amortization_years: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EquipmentLine {
    pub equipment: RecordId,
    /// Used only when no line in the sheet records usage hours
    pub allocation_ratio: f64,
    /// 0 means the product's expected production quantity
    pub annual_quantity: f64,
    pub usage_hours: f64,
}

impl Default for EquipmentLine {
    fn default() -> Self {
        Self {
            equipment: RecordId::default(),
            allocation_ratio: 0.5,
            annual_quantity: 0.0,
            usage_hours: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsLine {
    pub method: RecordId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricityLine {
    pub cost_per_unit: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Editable description of one product and its cost lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSheet {
    /// Set when the sheet edits an existing product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_large: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_medium: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_small: Option<RecordId>,
    pub size_variants: Vec<SizeVariant>,
    pub base_man_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub production_lot_size: f64,
    pub expected_production: ExpectedProduction,
    pub equipment_ids: Vec<RecordId>,

    pub materials: Vec<MaterialLine>,
    pub packaging: Vec<PackagingLine>,
    pub labor: Vec<LaborLine>,
    pub outsourcing: Vec<OutsourcingLine>,
    pub development: Vec<DevelopmentLine>,
    pub equipment: Vec<EquipmentLine>,
    pub logistics: Vec<LogisticsLine>,
    pub electricity: Vec<ElectricityLine>,
}

impl Default for ProductSheet {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            category_large: None,
            category_medium: None,
            category_small: None,
            size_variants: Vec::new(),
            base_man_hours: 0.0,
            registered_at: None,
            notes: None,
            production_lot_size: 1.0,
            expected_production: ExpectedProduction {
                period_years: 1.0,
                quantity: 1000.0,
            },
            equipment_ids: Vec::new(),
            materials: Vec::new(),
            packaging: Vec::new(),
            labor: Vec::new(),
            outsourcing: Vec::new(),
            development: Vec::new(),
            equipment: Vec::new(),
            logistics: Vec::new(),
            electricity: Vec::new(),
        }
    }
}

/// A typed-in number, or `fallback` when it is zero or not a number
fn number_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value != 0.0 {
        value
    } else {
        fallback
    }
}

fn positive_or_one(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn reference(id: &Option<RecordId>) -> Option<RecordId> {
    id.as_ref().filter(|id| !id.is_empty()).cloned()
}

fn currency_or_default(currency: Option<&str>) -> String {
    non_blank(currency).unwrap_or_else(default_currency)
}

impl ProductSheet {
    pub fn from_yaml(contents: &str) -> Result<Self, SheetError> {
        Ok(serde_yml::from_str(contents)?)
    }

    pub fn to_yaml(&self) -> Result<String, SheetError> {
        Ok(serde_yml::to_string(self)?)
    }

    /// Starter sheet with one line per category, pointing at the first
    /// master record of each kind
    pub fn template(data: &Dataset) -> Self {
        let first = |id: Option<&RecordId>| id.cloned().unwrap_or_default();
        Self {
            size_variants: vec![SizeVariant {
                label: String::new(),
                quantity: 0.0,
            }],
            materials: vec![MaterialLine {
                material: first(data.materials.first().map(|m| &m.id)),
                ..Default::default()
            }],
            packaging: vec![PackagingLine {
                item: first(data.packaging_items.first().map(|p| &p.id)),
                ..Default::default()
            }],
            labor: vec![LaborLine {
                role: first(data.labor_roles.first().map(|r| &r.id)),
                ..Default::default()
            }],
            outsourcing: vec![OutsourcingLine::default()],
            development: vec![DevelopmentLine::default()],
            logistics: vec![LogisticsLine {
                method: first(data.shipping_methods.first().map(|m| &m.id)),
            }],
            electricity: vec![ElectricityLine::default()],
            ..Default::default()
        }
    }

    /// Rebuild the sheet for a stored product
    ///
    /// Categories without entries stay empty, so applying the sheet again
    /// adds no lines the product did not have.
    pub fn from_product(product: &Product, data: &Dataset) -> Self {
        let entries = data.entries_for(product.id.as_str());
        Self {
            id: Some(product.id.clone()),
            name: product.name.clone(),
            category_large: product.category_large_id.clone(),
            category_medium: product.category_medium_id.clone(),
            category_small: product.category_small_id.clone(),
            size_variants: product.size_variants.clone(),
            base_man_hours: product.base_man_hours,
            registered_at: Some(product.registered_at),
            notes: product.notes.clone(),
            production_lot_size: product.production_lot_size,
            expected_production: product.expected_production,
            equipment_ids: product.equipment_ids.clone(),
            materials: entries
                .materials
                .iter()
                .map(|e| MaterialLine {
                    material: e.material_id.clone(),
                    usage_ratio: e.usage_ratio.unwrap_or(0.0),
                    description: e.description.clone(),
                })
                .collect(),
            packaging: entries
                .packaging
                .iter()
                .map(|e| PackagingLine {
                    item: e.packaging_item_id.clone(),
                    quantity: e.quantity,
                })
                .collect(),
            labor: entries
                .labor
                .iter()
                .map(|e| LaborLine {
                    role: e.labor_role_id.clone(),
                    hours: e.hours,
                    people: e.people_count,
                    hourly_rate_override: e.hourly_rate_override,
                })
                .collect(),
            outsourcing: entries
                .outsourcing
                .iter()
                .map(|e| OutsourcingLine {
                    note: e.note.clone(),
                    cost_per_unit: e.cost_per_unit,
                    currency: Some(e.currency.clone()),
                })
                .collect(),
            development: entries
                .development
                .iter()
                .map(|e| DevelopmentLine {
                    title: e.title.clone(),
                    prototype_labor_cost: e.prototype_labor_cost,
                    prototype_material_cost: e.prototype_material_cost,
                    tooling_cost: e.tooling_cost,
                    amortization_years: e.amortization_years,
                })
                .collect(),
            equipment: entries
                .equipment_allocations
                .iter()
                .map(|e| EquipmentLine {
                    equipment: e.equipment_id.clone(),
                    allocation_ratio: e.allocation_ratio,
                    annual_quantity: e.annual_quantity,
                    usage_hours: e.usage_hours.unwrap_or(0.0),
                })
                .collect(),
            logistics: entries
                .logistics
                .iter()
                .map(|e| LogisticsLine {
                    method: e.shipping_method_id.clone(),
                })
                .collect(),
            electricity: entries
                .electricity
                .iter()
                .map(|e| ElectricityLine {
                    cost_per_unit: e.cost_per_unit,
                    currency: Some(e.currency.clone()),
                })
                .collect(),
        }
    }

    /// Validate and normalize the sheet into a product and its cost batch
    ///
    /// Lines that reference unknown master records, or carry no amount, are
    /// dropped. Entry ids are left empty; they are assigned when the batch
    /// is stored.
    pub fn submit(&self, data: &Dataset) -> Result<(Product, CostBatch), SheetError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(SheetError::MissingName);
        }

        let product_id = reference(&self.id).unwrap_or_default();
        let expected_production = self.expected_production.normalized();
        let product_quantity = expected_production.quantity;

        let mut batch = CostBatch::default();

        for line in self.materials.iter().filter(|l| !l.material.is_empty()) {
            let Some(material) = data.find_material(line.material.as_str()) else {
                tracing::warn!(material = %line.material, "skipping material line: unknown material");
                continue;
            };
            let usage_ratio = finite_or_zero(line.usage_ratio).max(0.0);
            batch.materials.push(MaterialCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                material_id: material.id.clone(),
                description: non_blank(line.description.as_deref()),
                usage_ratio: Some(usage_ratio),
                cost_per_unit: material.cost_for_ratio(usage_ratio),
                currency: material.currency.clone(),
            });
        }

        for line in self.packaging.iter().filter(|l| !l.item.is_empty()) {
            let Some(item) = data.find_packaging_item(line.item.as_str()) else {
                tracing::warn!(item = %line.item, "skipping packaging line: unknown packaging item");
                continue;
            };
            batch.packaging.push(PackagingCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                packaging_item_id: item.id.clone(),
                quantity: number_or(line.quantity, 0.0),
                cost_per_unit: finite_or_zero(item.unit_cost),
                currency: item.currency.clone(),
            });
        }

        // The role does not have to resolve: an override alone prices the line
        for line in self.labor.iter().filter(|l| !l.role.is_empty()) {
            if data.find_labor_role(line.role.as_str()).is_none() {
                tracing::warn!(role = %line.role, "labor line references an unknown role");
            }
            batch.labor.push(LaborCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                labor_role_id: line.role.clone(),
                hours: number_or(line.hours, 0.0),
                people_count: number_or(line.people, 0.0),
                hourly_rate_override: line.hourly_rate_override.filter(|r| r.is_finite()),
            });
        }

        for line in &self.outsourcing {
            let note = non_blank(line.note.as_deref());
            let cost = number_or(line.cost_per_unit, 0.0);
            if note.is_none() && cost <= 0.0 {
                continue;
            }
            batch.outsourcing.push(OutsourcingCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                cost_per_unit: cost,
                currency: currency_or_default(line.currency.as_deref()),
                note,
            });
        }

        for line in &self.development {
            let labor = number_or(line.prototype_labor_cost, 0.0);
            let material = number_or(line.prototype_material_cost, 0.0);
            let tooling = number_or(line.tooling_cost, 0.0);
            if labor <= 0.0 && material <= 0.0 && tooling <= 0.0 {
                continue;
            }
            batch.development.push(DevelopmentCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                title: Some(
                    non_blank(line.title.as_deref())
                        .unwrap_or_else(|| DevelopmentCostEntry::DEFAULT_TITLE.to_string()),
                ),
                prototype_labor_cost: labor,
                prototype_material_cost: material,
                tooling_cost: tooling,
                amortization_years: positive_or_one(line.amortization_years),
            });
        }

        // Hours take over from the typed ratios as soon as any line has some
        let total_hours: f64 = self
            .equipment
            .iter()
            .map(|l| number_or(l.usage_hours, 0.0))
            .sum();
        for line in self.equipment.iter().filter(|l| !l.equipment.is_empty()) {
            if data.find_equipment(line.equipment.as_str()).is_none() {
                tracing::warn!(equipment = %line.equipment, "equipment line references unknown equipment");
            }
            let usage_hours = number_or(line.usage_hours, 0.0);
            let allocation_ratio = if total_hours > 0.0 {
                usage_hours / total_hours
            } else {
                number_or(line.allocation_ratio, 0.0)
            };
            batch.equipment_allocations.push(EquipmentAllocationEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                equipment_id: line.equipment.clone(),
                allocation_ratio,
                annual_quantity: number_or(line.annual_quantity, product_quantity),
                usage_hours: Some(usage_hours),
            });
        }

        for line in self.logistics.iter().filter(|l| !l.method.is_empty()) {
            let Some(method) = data.find_shipping_method(line.method.as_str()) else {
                tracing::warn!(method = %line.method, "skipping logistics line: unknown shipping method");
                continue;
            };
            batch.logistics.push(LogisticsCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                shipping_method_id: method.id.clone(),
                cost_per_unit: finite_or_zero(method.unit_cost),
                currency: method.currency.clone(),
            });
        }

        for line in &self.electricity {
            let cost = finite_or_zero(line.cost_per_unit);
            if cost <= 0.0 {
                continue;
            }
            batch.electricity.push(ElectricityCostEntry {
                id: RecordId::default(),
                product_id: product_id.clone(),
                cost_per_unit: cost,
                currency: currency_or_default(line.currency.as_deref()),
            });
        }

        let mut equipment_ids: Vec<RecordId> = Vec::new();
        let declared = self.equipment_ids.iter().filter(|id| !id.is_empty());
        let allocated = batch.equipment_allocations.iter().map(|e| &e.equipment_id);
        for id in declared.chain(allocated) {
            if !equipment_ids.contains(id) {
                equipment_ids.push(id.clone());
            }
        }

        let product = Product {
            id: product_id,
            name: name.to_string(),
            category_large_id: reference(&self.category_large),
            category_medium_id: reference(&self.category_medium),
            category_small_id: reference(&self.category_small),
            size_variants: self
                .size_variants
                .iter()
                .filter(|v| !v.label.trim().is_empty())
                .map(|v| SizeVariant {
                    label: v.label.trim().to_string(),
                    quantity: number_or(v.quantity, 0.0),
                })
                .collect(),
            base_man_hours: number_or(self.base_man_hours, 0.0),
            default_electricity_cost: batch
                .electricity
                .first()
                .map(|e| e.cost_per_unit)
                .unwrap_or(0.0),
            registered_at: self
                .registered_at
                .unwrap_or_else(|| Local::now().date_naive()),
            notes: non_blank(self.notes.as_deref()),
            production_lot_size: positive_or_one(self.production_lot_size),
            expected_production,
            equipment_ids,
        };

        Ok((product, batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::compute_unit_cost;

    fn sample_sheet() -> ProductSheet {
        ProductSheet {
            name: "  Canvas tote ".into(),
            size_variants: vec![
                SizeVariant {
                    label: " S ".into(),
                    quantity: 1500.0,
                },
                SizeVariant {
                    label: "".into(),
                    quantity: 10.0,
                },
            ],
            production_lot_size: 0.0,
            expected_production: ExpectedProduction {
                period_years: 1.0,
                quantity: 3000.0,
            },
            materials: vec![MaterialLine {
                material: "mat-1".into(),
                usage_ratio: 80.0,
                description: Some("body".into()),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let sheet = ProductSheet {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(
            sheet.submit(&Dataset::sample()),
            Err(SheetError::MissingName)
        ));
    }

    #[test]
    fn test_product_fields_are_normalized() {
        let (product, _) = sample_sheet().submit(&Dataset::sample()).unwrap();
        assert_eq!(product.name, "Canvas tote");
        assert_eq!(product.size_variants.len(), 1);
        assert_eq!(product.size_variants[0].label, "S");
        assert_eq!(product.production_lot_size, 1.0);
        assert_eq!(product.expected_production.quantity, 3000.0);
        assert!(product.id.is_empty());
    }

    #[test]
    fn test_material_cost_uses_ratio() {
        let (_, batch) = sample_sheet().submit(&Dataset::sample()).unwrap();
        assert_eq!(batch.materials.len(), 1);
        // 320 × 80 / 100
        assert_eq!(batch.materials[0].cost_per_unit, 256.0);
        assert_eq!(batch.materials[0].usage_ratio, Some(80.0));
        assert_eq!(batch.materials[0].currency, "JPY");
    }

    #[test]
    fn test_negative_ratio_and_unknown_material() {
        let mut sheet = sample_sheet();
        sheet.materials = vec![
            MaterialLine {
                material: "mat-1".into(),
                usage_ratio: -20.0,
                description: None,
            },
            MaterialLine {
                material: "missing".into(),
                usage_ratio: 50.0,
                description: None,
            },
        ];
        let (_, batch) = sheet.submit(&Dataset::sample()).unwrap();
        assert_eq!(batch.materials.len(), 1);
        assert_eq!(batch.materials[0].usage_ratio, Some(0.0));
        assert_eq!(batch.materials[0].cost_per_unit, 0.0);
    }

    #[test]
    fn test_empty_lines_are_dropped() {
        let data = Dataset::sample();
        let mut sheet = ProductSheet::template(&data);
        sheet.name = "Template".into();
        let (_, batch) = sheet.submit(&data).unwrap();
        // blank outsourcing, development and electricity lines carry nothing
        assert!(batch.outsourcing.is_empty());
        assert!(batch.development.is_empty());
        assert!(batch.electricity.is_empty());
        assert_eq!(batch.materials.len(), 1);
        assert_eq!(batch.packaging.len(), 1);
        assert_eq!(batch.labor.len(), 1);
        assert_eq!(batch.logistics.len(), 1);
        assert_eq!(batch.logistics[0].cost_per_unit, 180.0);
    }

    #[test]
    fn test_development_defaults() {
        let mut sheet = sample_sheet();
        sheet.development = vec![DevelopmentLine {
            title: Some("  ".into()),
            tooling_cost: 40_000.0,
            amortization_years: 0.0,
            ..Default::default()
        }];
        let (_, batch) = sheet.submit(&Dataset::sample()).unwrap();
        let entry = &batch.development[0];
        assert_eq!(entry.title.as_deref(), Some(DevelopmentCostEntry::DEFAULT_TITLE));
        assert_eq!(entry.amortization_years, 1.0);
    }

    #[test]
    fn test_equipment_hours_become_ratios() {
        let mut sheet = sample_sheet();
        sheet.equipment_ids = vec!["eq-1".into()];
        sheet.equipment = vec![
            EquipmentLine {
                equipment: "eq-1".into(),
                usage_hours: 0.6,
                ..Default::default()
            },
            EquipmentLine {
                equipment: "eq-2".into(),
                usage_hours: 0.4,
                annual_quantity: 500.0,
                ..Default::default()
            },
        ];
        let (product, batch) = sheet.submit(&Dataset::sample()).unwrap();
        let allocations = &batch.equipment_allocations;
        assert!((allocations[0].allocation_ratio - 0.6).abs() < 1e-9);
        assert!((allocations[1].allocation_ratio - 0.4).abs() < 1e-9);
        // annual quantity 0 falls back to the product quantity
        assert_eq!(allocations[0].annual_quantity, 3000.0);
        assert_eq!(allocations[1].annual_quantity, 500.0);
        assert_eq!(allocations[0].usage_hours, Some(0.6));
        assert_eq!(product.equipment_ids, vec![RecordId::from("eq-1"), RecordId::from("eq-2")]);
    }

    #[test]
    fn test_equipment_ratio_kept_without_hours() {
        let mut sheet = sample_sheet();
        sheet.equipment = vec![EquipmentLine {
            equipment: "eq-1".into(),
            allocation_ratio: 0.25,
            ..Default::default()
        }];
        let (_, batch) = sheet.submit(&Dataset::sample()).unwrap();
        assert_eq!(batch.equipment_allocations[0].allocation_ratio, 0.25);
        assert_eq!(batch.equipment_allocations[0].usage_hours, Some(0.0));
    }

    #[test]
    fn test_electricity_default_cost() {
        let mut sheet = sample_sheet();
        sheet.electricity = vec![
            ElectricityLine {
                cost_per_unit: 0.0,
                currency: None,
            },
            ElectricityLine {
                cost_per_unit: 25.0,
                currency: Some("usd".into()),
            },
        ];
        let (product, batch) = sheet.submit(&Dataset::sample()).unwrap();
        assert_eq!(batch.electricity.len(), 1);
        assert_eq!(product.default_electricity_cost, 25.0);
    }

    #[test]
    fn test_outsourcing_kept_with_note_only() {
        let mut sheet = sample_sheet();
        sheet.outsourcing = vec![
            OutsourcingLine {
                note: Some("finishing".into()),
                cost_per_unit: 0.0,
                currency: None,
            },
            OutsourcingLine::default(),
        ];
        let (_, batch) = sheet.submit(&Dataset::sample()).unwrap();
        assert_eq!(batch.outsourcing.len(), 1);
        assert_eq!(batch.outsourcing[0].currency, "JPY");
    }

    #[test]
    fn test_edit_round_trip_through_yaml() {
        let mut data = Dataset::sample();
        let product = data.find_product("prod-1").unwrap().clone();
        let sheet = ProductSheet::from_product(&product, &data);
        let yaml = sheet.to_yaml().unwrap();
        let parsed = ProductSheet::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, sheet);

        let (resubmitted, batch) = parsed.submit(&data).unwrap();
        assert_eq!(resubmitted.id, "prod-1");
        assert_eq!(resubmitted.registered_at, product.registered_at);
        assert_eq!(batch.len(), data.entries_for("prod-1").len());

        data.upsert_product(resubmitted, batch);
        assert_eq!(data.products.len(), 1);
        let costs = compute_unit_cost("prod-1", &data);
        // material cost is recomputed from the master: 320 × 0.8 + 450 × 0.2
        assert!((costs.material - 346.0).abs() < 1e-9);
        assert!((costs.equipment - 32.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            ProductSheet::from_yaml("name: [unclosed"),
            Err(SheetError::Parse(_))
        ));
    }
}
