//! End-to-end library tests
//!
//! Loads the shop fixture from disk and runs the full pipeline through the
//! public API: loading, scoring, rules, tracking and reporting.

use std::path::{Path, PathBuf};

use archrisk::config::{ProjectConfig, RulesConfig, TrackingConfig};
use archrisk::loader::{load_model, LoadError};
use archrisk::models::{RiskStatus, Severity};
use archrisk::pipeline::{analyze, Pipeline};
use archrisk::reporters::{self, OutputFormat};

const UNENCRYPTED_ID: &str = "unencrypted-communication@browser>order@browser@web";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn shop_config() -> ProjectConfig {
    ProjectConfig::default()
}

#[test]
fn test_shop_fixture_loads() {
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    assert_eq!(model.title, "Shop");
    assert!(model.technical_asset("browser").is_some());
    assert_eq!(model.incoming_links("web").len(), 1);
    assert!(model.is_across_network_trust_boundary(&model.incoming_links("web")[0]));
}

#[test]
fn test_shop_analysis_applies_wildcard_tracking() {
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    let report = analyze(model, &shop_config()).expect("analysis");

    let waf = report
        .risks
        .iter()
        .find(|r| r.synthetic_id == "missing-waf@web")
        .expect("missing WAF risk");
    assert_eq!(waf.risk_status, RiskStatus::Mitigated);

    let unencrypted = report
        .risks
        .iter()
        .find(|r| r.synthetic_id == UNENCRYPTED_ID)
        .expect("unencrypted communication risk");
    assert_eq!(unencrypted.risk_status, RiskStatus::Unchecked);
    assert_eq!(unencrypted.severity, Severity::Elevated);

    assert_eq!(report.tracked_risks, 1);
    assert!(report.orphaned_tracking.is_empty());
    assert_eq!(report.summary.total, report.risks.len());
    assert_eq!(report.summary.still_at_risk, report.risks.len() - 1);
}

#[test]
fn test_risks_are_in_report_order() {
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    let report = analyze(model, &shop_config()).expect("analysis");

    for pair in report.risks.windows(2) {
        assert!(pair[0].severity >= pair[1].severity);
    }
}

#[test]
fn test_analysis_is_deterministic() {
    let run = |workers| {
        let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
        let report = Pipeline::new(shop_config())
            .with_workers(workers)
            .run(model)
            .expect("analysis");
        report
            .risks
            .iter()
            .map(|r| (r.synthetic_id.clone(), r.severity, r.risk_status))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(1), run(4));
}

#[test]
fn test_raa_scores_are_bounded() {
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    let report = analyze(model, &shop_config()).expect("analysis");

    assert_eq!(report.raa.len(), 2);
    for (asset, score) in &report.raa {
        assert!(
            (1.0..=100.0).contains(score),
            "{} scored {}",
            asset,
            score
        );
    }
}

#[test]
fn test_orphaned_tracking_from_file() {
    let yaml = std::fs::read_to_string(fixture("shop.yaml")).expect("read fixture");
    let yaml = yaml.replace("\"missing-waf@*\"", "\"missing-waf@payments\"");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("orphaned.yaml");
    std::fs::write(&path, yaml).expect("write model");

    let model = load_model(&path).expect("model loads");
    assert!(analyze(model, &shop_config()).is_err());

    let lenient = ProjectConfig {
        tracking: TrackingConfig {
            ignore_orphans: true,
        },
        ..Default::default()
    };
    let model = load_model(&path).expect("model loads");
    let report = analyze(model, &lenient).expect("analysis");
    assert_eq!(report.orphaned_tracking, vec!["missing-waf@payments".to_string()]);
    assert_eq!(report.tracked_risks, 0);
}

#[test]
fn test_skipping_a_rule_drops_its_risks() {
    let config = ProjectConfig {
        rules: RulesConfig {
            skip: vec!["unencrypted-communication".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    let report = analyze(model, &config).expect("analysis");
    assert!(report
        .risks
        .iter()
        .all(|r| r.category_id != "unencrypted-communication"));
}

fn write_variant(dir: &tempfile::TempDir, edit: impl Fn(String) -> String) -> PathBuf {
    let yaml = std::fs::read_to_string(fixture("shop.yaml")).expect("read fixture");
    let path = dir.path().join("variant.yaml");
    std::fs::write(&path, edit(yaml)).expect("write model");
    path
}

#[test]
fn test_asset_id_with_separator_fails_to_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_variant(&dir, |yaml| {
        yaml.replace("id: web\n", "id: \"web@edge\"\n")
            .replace("target: web\n", "target: \"web@edge\"\n")
            .replace("[web]", "[\"web@edge\"]")
    });
    let err = load_model(&path).unwrap_err();
    assert!(matches!(err, LoadError::InvalidId { ref id, .. } if id == "web@edge"));
}

#[test]
fn test_tags_must_be_declared() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tagged = |yaml: String| {
        yaml.replace(
            "    custom_developed_parts: true\n",
            "    custom_developed_parts: true\n    tags: [PCI]\n",
        )
    };

    let path = write_variant(&dir, tagged);
    let err = load_model(&path).unwrap_err();
    assert!(matches!(err, LoadError::UnknownTag { ref tag, .. } if tag == "PCI"));

    let path = write_variant(&dir, |yaml| {
        tagged(yaml).replace("tags_available: []", "tags_available: [pci]")
    });
    let model = load_model(&path).expect("declared tag loads");
    let report = analyze(model, &shop_config()).expect("analysis");
    assert_eq!(report.tracked_risks, 1);
}

#[test]
fn test_unsupported_extension() {
    let err = load_model(Path::new("model.toml")).unwrap_err();
    assert!(matches!(err, LoadError::UnsupportedFormat(_)));
}

#[test]
fn test_json_report_lists_risks() {
    let model = load_model(&fixture("shop.yaml")).expect("fixture loads");
    let report = analyze(model, &shop_config()).expect("analysis");
    let json = reporters::report_with_format(&report, OutputFormat::Json).expect("render");

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");
    assert_eq!(value["title"], "Shop");
    let ids: Vec<&str> = value["risks"]
        .as_array()
        .expect("risks array")
        .iter()
        .filter_map(|r| r["synthetic_id"].as_str())
        .collect();
    assert!(ids.contains(&UNENCRYPTED_ID));
}
