//! Built-in sample dataset
//!
//! Used when no snapshot has been stored yet, and by `costbook data seed`.
//! One tote bag product with every cost category filled in.

use chrono::NaiveDate;

use crate::core::dataset::Dataset;
use crate::core::identity::RecordId;
use crate::entities::{
    Categories, CategoryLarge, CategoryMedium, CategorySmall, CostEntries, DevelopmentCostEntry,
    ElectricityCostEntry, Equipment, EquipmentAllocationEntry, ExpectedProduction, LaborCostEntry,
    LaborRole, LogisticsCostEntry, Material, MaterialCostEntry, OutsourcingCostEntry,
    PackagingCostEntry, PackagingItem, Product, ShippingMethod, SizeVariant,
};

const JPY: &str = "JPY";

fn id(s: &str) -> RecordId {
    RecordId::from(s)
}

fn text(s: &str) -> Option<String> {
    Some(s.to_string())
}

impl Dataset {
    /// The sample dataset shipped with the tool
    pub fn sample() -> Self {
        Self {
            categories: sample_categories(),
            materials: vec![
                Material {
                    id: id("mat-1"),
                    name: "キャンバス生地".into(),
                    unit: "m".into(),
                    size_description: "50m ロール".into(),
                    currency: JPY.into(),
                    unit_cost: 320.0,
                    supplier: text("FabricMart"),
                    note: text("8号帆布"),
                },
                Material {
                    id: id("mat-2"),
                    name: "本革".into(),
                    unit: "㎡".into(),
                    size_description: "10㎡ ロット".into(),
                    currency: JPY.into(),
                    unit_cost: 450.0,
                    supplier: text("LeatherWorks"),
                    note: text("タンニンなめし"),
                },
            ],
            packaging_items: vec![
                PackagingItem {
                    id: id("pack-1"),
                    name: "段ボール S".into(),
                    unit: "枚".into(),
                    size_description: "320x250x120".into(),
                    unit_cost: 80.0,
                    currency: JPY.into(),
                    note: text("クラフト"),
                },
                PackagingItem {
                    id: id("pack-2"),
                    name: "緩衝材".into(),
                    unit: "m".into(),
                    size_description: "ロール".into(),
                    unit_cost: 30.0,
                    currency: JPY.into(),
                    note: text("エアキャップ"),
                },
            ],
            shipping_methods: vec![
                ShippingMethod {
                    id: id("ship-1"),
                    name: "宅配便".into(),
                    description: text("一般的な箱発送"),
                    unit_cost: 180.0,
                    currency: JPY.into(),
                    note: text("佐川・ヤマト想定"),
                },
                ShippingMethod {
                    id: id("ship-2"),
                    name: "メール便".into(),
                    description: text("ポスト投函"),
                    unit_cost: 120.0,
                    currency: JPY.into(),
                    note: text("小型製品向け"),
                },
            ],
            labor_roles: vec![
                LaborRole {
                    id: id("lab-1"),
                    name: "裁断".into(),
                    hourly_rate: 1800.0,
                    currency: JPY.into(),
                    note: None,
                },
                LaborRole {
                    id: id("lab-2"),
                    name: "縫製".into(),
                    hourly_rate: 2200.0,
                    currency: JPY.into(),
                    note: None,
                },
            ],
            equipments: vec![
                Equipment {
                    id: id("eq-1"),
                    name: "工業用ミシン".into(),
                    acquisition_cost: 400_000.0,
                    currency: JPY.into(),
                    amortization_years: 5.0,
                    note: text("平ミシン"),
                },
                Equipment {
                    id: id("eq-2"),
                    name: "裁断機".into(),
                    acquisition_cost: 600_000.0,
                    currency: JPY.into(),
                    amortization_years: 5.0,
                    note: text("自動裁断"),
                },
            ],
            products: vec![sample_product()],
            cost_entries: sample_cost_entries(),
        }
    }
}

fn sample_categories() -> Categories {
    Categories {
        large: vec![
            CategoryLarge {
                id: id("cat-l-1"),
                name: "バッグ".into(),
                description: text("バッグ系プロダクト"),
            },
            CategoryLarge {
                id: id("cat-l-2"),
                name: "アクセサリー".into(),
                description: text("アクセサリー系"),
            },
        ],
        medium: vec![
            CategoryMedium {
                id: id("cat-m-1"),
                large_id: id("cat-l-1"),
                name: "トート".into(),
                description: text("トートバッグ"),
            },
            CategoryMedium {
                id: id("cat-m-2"),
                large_id: id("cat-l-1"),
                name: "ショルダー".into(),
                description: text("ショルダーバッグ"),
            },
        ],
        small: vec![CategorySmall {
            id: id("cat-s-1"),
            medium_id: id("cat-m-1"),
            name: "ミニトート".into(),
            description: text("小型トート"),
        }],
    }
}

fn sample_product() -> Product {
    Product {
        id: id("prod-1"),
        name: "デイリーミニトート".into(),
        category_large_id: Some(id("cat-l-1")),
        category_medium_id: Some(id("cat-m-1")),
        category_small_id: Some(id("cat-s-1")),
        size_variants: vec![
            SizeVariant {
                label: "S".into(),
                quantity: 1500.0,
            },
            SizeVariant {
                label: "M".into(),
                quantity: 1500.0,
            },
        ],
        base_man_hours: 1.5,
        default_electricity_cost: 25.0,
        registered_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default(),
        notes: text("S/Mの2サイズ展開。金具変更や刺繍オプションあり。"),
        production_lot_size: 50.0,
        expected_production: ExpectedProduction {
            period_years: 1.0,
            quantity: 3000.0,
        },
        equipment_ids: vec![id("eq-1"), id("eq-2")],
    }
}

fn sample_cost_entries() -> CostEntries {
    let product = id("prod-1");
    CostEntries {
        materials: vec![
            MaterialCostEntry {
                id: id("mat-cost-1"),
                product_id: product.clone(),
                material_id: id("mat-1"),
                description: text("本体用"),
                usage_ratio: Some(80.0),
                cost_per_unit: 350.0,
                currency: JPY.into(),
            },
            MaterialCostEntry {
                id: id("mat-cost-2"),
                product_id: product.clone(),
                material_id: id("mat-2"),
                description: text("持ち手革"),
                usage_ratio: Some(20.0),
                cost_per_unit: 180.0,
                currency: JPY.into(),
            },
        ],
        packaging: vec![
            PackagingCostEntry {
                id: id("pack-cost-1"),
                product_id: product.clone(),
                packaging_item_id: id("pack-1"),
                quantity: 1.0,
                cost_per_unit: 80.0,
                currency: JPY.into(),
            },
            PackagingCostEntry {
                id: id("pack-cost-2"),
                product_id: product.clone(),
                packaging_item_id: id("pack-2"),
                quantity: 0.5,
                cost_per_unit: 30.0,
                currency: JPY.into(),
            },
        ],
        labor: vec![
            LaborCostEntry {
                id: id("lab-cost-1"),
                product_id: product.clone(),
                labor_role_id: id("lab-1"),
                hours: 0.4,
                people_count: 1.0,
                hourly_rate_override: None,
            },
            LaborCostEntry {
                id: id("lab-cost-2"),
                product_id: product.clone(),
                labor_role_id: id("lab-2"),
                hours: 0.8,
                people_count: 1.0,
                hourly_rate_override: None,
            },
        ],
        outsourcing: vec![OutsourcingCostEntry {
            id: id("out-cost-1"),
            product_id: product.clone(),
            cost_per_unit: 120.0,
            currency: JPY.into(),
            note: text("部分仕上げ外注"),
        }],
        development: vec![DevelopmentCostEntry {
            id: id("dev-cost-1"),
            product_id: product.clone(),
            title: text("初期試作"),
            prototype_labor_cost: 150_000.0,
            prototype_material_cost: 60_000.0,
            tooling_cost: 40_000.0,
            amortization_years: 2.0,
        }],
        equipment_allocations: vec![
            EquipmentAllocationEntry {
                id: id("eq-alloc-1"),
                product_id: product.clone(),
                equipment_id: id("eq-1"),
                allocation_ratio: 0.5,
                annual_quantity: 3000.0,
                usage_hours: Some(0.6),
            },
            EquipmentAllocationEntry {
                id: id("eq-alloc-2"),
                product_id: product.clone(),
                equipment_id: id("eq-2"),
                allocation_ratio: 0.3,
                annual_quantity: 3000.0,
                usage_hours: Some(0.4),
            },
        ],
        logistics: vec![LogisticsCostEntry {
            id: id("log-cost-1"),
            product_id: product.clone(),
            shipping_method_id: id("ship-1"),
            cost_per_unit: 180.0,
            currency: JPY.into(),
        }],
        electricity: vec![ElectricityCostEntry {
            id: id("ele-cost-1"),
            product_id: product,
            cost_per_unit: 25.0,
            currency: JPY.into(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_counts() {
        let data = Dataset::sample();
        assert_eq!(data.products.len(), 1);
        assert_eq!(data.master_count(), 10);
        assert_eq!(data.cost_entry_count(), 12);
        assert_eq!(data.categories.len(), 5);
    }

    #[test]
    fn test_sample_category_path() {
        let data = Dataset::sample();
        let path = data.category_path(&data.products[0]);
        assert_eq!(path.as_deref(), Some("バッグ / トート / ミニトート"));
    }

    #[test]
    fn test_sample_roundtrips_through_json() {
        let data = Dataset::sample();
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"equipmentAllocations\""));
        assert!(json.contains("\"packagingItems\""));
        let parsed: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }
}
