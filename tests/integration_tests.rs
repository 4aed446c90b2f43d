//! Integration tests for the costbook CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd. Every
//! test works in its own temp directory; `init` seeds the sample dataset.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a costbook command with a clean environment
fn costbook() -> Command {
    let mut cmd = Command::cargo_bin("costbook").unwrap();
    cmd.env_remove("COSTBOOK_CURRENCY")
        .env_remove("COSTBOOK_DATA")
        .env_remove("COSTBOOK_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Helper to create a project seeded with the sample dataset
fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    costbook().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

fn snapshot_path(tmp: &TempDir) -> std::path::PathBuf {
    tmp.path().join(".costbook/cost-app-data-v1.json")
}

/// Run a command in the project and parse its JSON output
fn json(tmp: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = costbook()
        .current_dir(tmp.path())
        .args(args)
        .args(["-f", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn approx(value: &serde_json::Value, expected: f64) -> bool {
    value
        .as_f64()
        .map_or(false, |v| (v - expected).abs() < 0.01)
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    costbook()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("unit cost"))
        .stdout(predicate::str::contains("cost"))
        .stdout(predicate::str::contains("product"));
}

#[test]
fn test_version_displays() {
    costbook()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("costbook"));
}

#[test]
fn test_outside_project_fails() {
    let tmp = TempDir::new().unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "summary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not"));
}

#[test]
fn test_completions_bash() {
    costbook()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("costbook"));
}

// ============================================================================
// Init Tests
// ============================================================================

#[test]
fn test_init_creates_project_and_snapshot() {
    let tmp = setup_test_project();
    assert!(tmp.path().join(".costbook/config.yaml").exists());
    let snapshot = fs::read_to_string(snapshot_path(&tmp)).unwrap();
    assert!(snapshot.contains("\"costEntries\""));
    assert!(snapshot.contains("prod-1"));
}

#[test]
fn test_init_twice_suggests_force() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"))
        .stdout(predicate::str::contains("--force"));
}

#[test]
fn test_init_empty() {
    let tmp = TempDir::new().unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["init", "--empty"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");
}

#[test]
fn test_project_flag_from_other_directory() {
    let tmp = setup_test_project();
    let elsewhere = TempDir::new().unwrap();
    costbook()
        .current_dir(elsewhere.path())
        .arg("--project")
        .arg(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

// ============================================================================
// Cost Tests
// ============================================================================

#[test]
fn test_cost_show_sample_breakdown() {
    let tmp = setup_test_project();
    let view = json(&tmp, &["cost", "show", "prod-1"]);
    let costs = &view["costs"];
    assert!(approx(&costs["material"], 530.0));
    assert!(approx(&costs["packaging"], 95.0));
    assert!(approx(&costs["labor"], 2480.0));
    assert!(approx(&costs["outsourcing"], 120.0));
    assert!(approx(&costs["development"], 41.67));
    assert!(approx(&costs["equipment"], 32.0));
    assert!(approx(&costs["logistics"], 180.0));
    assert!(approx(&costs["electricity"], 25.0));
    assert!(approx(&costs["total"], 3503.67));
    assert_eq!(view["currency"], "JPY");
}

#[test]
fn test_cost_show_by_name() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "show", "デイリーミニトート"])
        .assert()
        .success()
        .stdout(predicate::str::contains("¥3,504"));
}

#[test]
fn test_cost_show_unknown_product() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "show", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No product found"));
}

#[test]
fn test_cost_summary_csv() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "summary", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id,name,material,packaging,labor,outsourcing,development,equipment,logistics,electricity,total\n",
        ))
        .stdout(predicate::str::contains("prod-1,デイリーミニトート,530,95,2480,120,42,32,180,25,3504"));
}

#[test]
fn test_cost_lines_filtered() {
    let tmp = setup_test_project();
    let lines = json(&tmp, &["cost", "lines", "--product", "prod-1", "--category", "labor"]);
    let lines = lines.as_array().unwrap();
    assert_eq!(lines.len(), 2);
    let sum: f64 = lines.iter().filter_map(|l| l["amount"].as_f64()).sum();
    assert!((sum - 2480.0).abs() < 1e-6);
}

#[test]
fn test_cost_lines_rejects_unknown_category() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "lines", "--category", "tax"])
        .assert()
        .failure();
}

#[test]
fn test_cost_usage_views() {
    let tmp = setup_test_project();
    let materials = json(&tmp, &["cost", "materials"]);
    assert_eq!(materials.as_array().unwrap().len(), 2);

    let equipment = json(&tmp, &["cost", "equipment"]);
    let groups = equipment.as_array().unwrap();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|g| g["entries"].as_array().map_or(false, |e| e.len() == 1)));
}

#[test]
fn test_precision_config_changes_output() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "set", "precision", "2"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["cost", "summary", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3503.67"));
}

// ============================================================================
// Product Tests
// ============================================================================

const POUCH_SHEET: &str = r#"
name: Test Pouch
expected_production:
  periodYears: 1
  quantity: 1000
materials:
  - material: mat-1
    usage_ratio: 50
  - material: mat-missing
labor:
  - role: lab-1
    hours: 0.5
logistics:
  - method: ship-2
"#;

fn apply_pouch(tmp: &TempDir) -> String {
    let sheet = tmp.path().join("pouch.yaml");
    fs::write(&sheet, POUCH_SHEET).unwrap();
    let output = costbook()
        .current_dir(tmp.path())
        .args(["product", "apply", "pouch.yaml", "-f", "id"])
        .output()
        .unwrap();
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[test]
fn test_product_apply_registers_product() {
    let tmp = setup_test_project();
    let id = apply_pouch(&tmp);
    assert!(id.starts_with("PROD-"));

    let view = json(&tmp, &["cost", "show", &id]);
    assert!(approx(&view["costs"]["material"], 160.0));
    assert!(approx(&view["costs"]["labor"], 900.0));

    costbook()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_product_sheet_round_trip_reprices_materials() {
    let tmp = setup_test_project();
    let before = json(&tmp, &["cost", "show", "prod-1"]);

    costbook()
        .current_dir(tmp.path())
        .args(["product", "sheet", "prod-1", "-o", "tote.yaml"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "apply", "tote.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated"));

    // Material lines are re-priced from unit cost x usage ratio on submit
    let after = json(&tmp, &["cost", "show", "prod-1"]);
    assert!(approx(&before["costs"]["material"], 530.0));
    assert!(approx(&after["costs"]["material"], 346.0));
    for key in [
        "packaging",
        "labor",
        "outsourcing",
        "development",
        "equipment",
        "logistics",
        "electricity",
    ] {
        assert!(
            approx(&after["costs"][key], before["costs"][key].as_f64().unwrap()),
            "{} changed",
            key
        );
    }
    assert!(approx(&after["costs"]["total"], 3319.67));
    costbook()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n");
}

#[test]
fn test_product_apply_dry_run_does_not_save() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("pouch.yaml"), POUCH_SHEET).unwrap();
    let before = fs::read_to_string(snapshot_path(&tmp)).unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "apply", "pouch.yaml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not saved"));
    assert_eq!(fs::read_to_string(snapshot_path(&tmp)).unwrap(), before);
}

#[test]
fn test_product_apply_requires_name() {
    let tmp = setup_test_project();
    fs::write(tmp.path().join("blank.yaml"), "name: '  '\n").unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "apply", "blank.yaml"])
        .assert()
        .failure();
}

#[test]
fn test_product_template_is_valid_yaml() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "template"])
        .assert()
        .success()
        .stdout(predicate::str::contains("materials:"))
        .stdout(predicate::str::contains("mat-1"));
}

#[test]
fn test_product_remove_cascades() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "remove", "prod-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cost line(s)"));

    let lines = json(&tmp, &["cost", "lines"]);
    assert!(lines.as_array().unwrap().is_empty());

    costbook()
        .current_dir(tmp.path())
        .args(["product", "remove", "prod-1"])
        .assert()
        .failure();
}

// ============================================================================
// Master / Category Tests
// ============================================================================

#[test]
fn test_master_material_add_and_update() {
    let tmp = setup_test_project();
    let output = costbook()
        .current_dir(tmp.path())
        .args(["master", "material", "add", "Denim", "--unit-cost", "800", "--unit", "m", "-f", "id"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let id = String::from_utf8_lossy(&output.stdout).trim().to_string();
    assert!(id.starts_with("MAT-"));

    costbook()
        .current_dir(tmp.path())
        .args(["master", "material", "update", "denim", "--unit-cost", "850"])
        .assert()
        .success();

    let materials = json(&tmp, &["master", "material", "list"]);
    let denim = materials
        .as_array()
        .unwrap()
        .iter()
        .find(|m| m["id"] == id.as_str())
        .unwrap();
    assert!(approx(&denim["unitCost"], 850.0));
}

#[test]
fn test_master_rejects_negative_cost() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["master", "labor", "add", "Finishing", "--rate", "-5"])
        .assert()
        .failure();
}

#[test]
fn test_labor_rate_change_applies_to_existing_lines() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["master", "labor", "update", "lab-1", "--rate", "2000"])
        .assert()
        .success();
    let view = json(&tmp, &["cost", "show", "prod-1"]);
    // 2000 × 0.4 + 2200 × 0.8
    assert!(approx(&view["costs"]["labor"], 2560.0));
}

#[test]
fn test_category_add_tree() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["category", "add", "Wallets", "--level", "medium", "--parent", "cat-l-2"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["category", "add", "Orphan", "--level", "small"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--parent"));
    costbook()
        .current_dir(tmp.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wallets"));
}

#[test]
fn test_category_update_renames_and_moves() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["category", "update", "cat-m-1", "--name", "Big totes", "--parent", "cat-l-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated medium category"));

    let cats = json(&tmp, &["category", "list"]);
    assert_eq!(cats["medium"][0]["id"], "cat-m-1");
    assert_eq!(cats["medium"][0]["name"], "Big totes");
    assert_eq!(cats["medium"][0]["largeId"], "cat-l-2");

    costbook()
        .current_dir(tmp.path())
        .args(["product", "show", "prod-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Big totes"));
}

#[test]
fn test_category_update_rejects_bad_parent() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["category", "update", "cat-s-1", "--parent", "nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No medium category found"));
    costbook()
        .current_dir(tmp.path())
        .args(["category", "update", "cat-l-1", "--parent", "cat-l-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has no parent"));
    costbook()
        .current_dir(tmp.path())
        .args(["category", "update", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No category found"));
}

// ============================================================================
// Data Tests
// ============================================================================

#[test]
fn test_data_export_import_round_trip() {
    let tmp = setup_test_project();
    let export = tmp.path().join("backup.json");
    costbook()
        .current_dir(tmp.path())
        .args(["data", "export", "backup.json"])
        .assert()
        .success();
    assert!(export.exists());

    costbook()
        .current_dir(tmp.path())
        .args(["data", "reset", "--yes"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("0\n");

    costbook()
        .current_dir(tmp.path())
        .args(["data", "import", "backup.json"])
        .assert()
        .success();
    let view = json(&tmp, &["cost", "show", "prod-1"]);
    assert!(approx(&view["costs"]["total"], 3503.67));
}

#[test]
fn test_data_import_malformed_keeps_snapshot() {
    let tmp = setup_test_project();
    let before = fs::read_to_string(snapshot_path(&tmp)).unwrap();
    fs::write(tmp.path().join("bad.json"), "{ not json").unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["data", "import", "bad.json"])
        .assert()
        .failure();
    assert_eq!(fs::read_to_string(snapshot_path(&tmp)).unwrap(), before);
}

#[test]
fn test_data_reset_requires_yes() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["data", "reset"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_malformed_snapshot_falls_back_to_sample() {
    let tmp = setup_test_project();
    fs::write(snapshot_path(&tmp), "garbage").unwrap();
    costbook()
        .current_dir(tmp.path())
        .args(["product", "list", "--count"])
        .assert()
        .success()
        .stdout("1\n")
        .stderr(predicate::str::contains("sample dataset"));
    assert_eq!(fs::read_to_string(snapshot_path(&tmp)).unwrap(), "garbage");

    let status = json(&tmp, &["data", "status"]);
    assert_eq!(status["stored"], true);
    assert_eq!(status["readable"], false);
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_set_show_unset() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "set", "currency", "usd"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "show", "currency"])
        .assert()
        .success()
        .stdout("USD\n");
    costbook()
        .current_dir(tmp.path())
        .args(["config", "unset", "currency"])
        .assert()
        .success();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "show", "currency"])
        .assert()
        .failure();
}

#[test]
fn test_config_rejects_bad_values() {
    let tmp = setup_test_project();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "set", "precision", "9"])
        .assert()
        .failure();
    costbook()
        .current_dir(tmp.path())
        .args(["config", "set", "colour", "red"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key"));
}

#[test]
fn test_config_keys() {
    costbook()
        .args(["config", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("currency"))
        .stdout(predicate::str::contains("data_file"));
}
