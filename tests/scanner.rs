mod common;

use qcsim_lib::app::scan_file;
use qcsim_lib::qcsim_core::classifier::{CollapseStatus, CoverageStatus, InterventionPriority};
use qcsim_lib::qcsim_core::scanner::geometry::Geometry;
use qcsim_lib::qcsim_core::scanner::{
    analyze_coverage, estimate_expected_coverage, scan, Baseline, CrisisRecord,
};
use qcsim_lib::qcsim_data::MediaCoverage;

const GAZA_RECORD: &str = r#"{
    "name": "Gaza 2024",
    "components": {
        "severity": 0.85,
        "irreversibility": 0.75,
        "time_pressure": 0.90,
        "response_capacity": 0.80,
        "recovery_potential": 0.70
    },
    "coverage": {
        "actual_articles": 1400,
        "expected_articles": 12000,
        "actual_social_mentions": 50000,
        "expected_social_mentions": 200000
    },
    "resilience": { "adaptive_capacity": 0.2, "reserves": 0.1, "social_cohesion": 0.6 },
    "amplification": { "vulnerability": 0.9, "exposure": 0.8, "fragility": 0.5 },
    "patterns": ["blockade", "displacement", "siege", "information_warfare", "unknown"]
}"#;

#[test]
fn test_scan_record_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaza.json");
    std::fs::write(&path, GAZA_RECORD).unwrap();

    let analysis = scan_file(&path).unwrap();
    assert_eq!(analysis.name, "Gaza 2024");
    assert_eq!(analysis.collapse.status, CollapseStatus::Catastrophic);
    assert_eq!(analysis.collapse.priority, InterventionPriority::Urgent);
    assert_close!(analysis.collapse.delta, 1.025);

    let coverage = analysis.coverage.as_ref().unwrap();
    assert_eq!(coverage.status, CoverageStatus::ExtremeSuppression);
    assert_close!(coverage.lsse, 0.117);
    assert_eq!(coverage.coverage_gap, 10_600);
    assert_close!(coverage.gap_percentage, 88.3);
    assert_eq!(coverage.timeframe_days, 30);
    assert_eq!(coverage.social_lsse, Some(0.25));

    assert_close!(analysis.resilience.as_ref().unwrap().gamma, 0.3);
    assert_close!(analysis.amplification.as_ref().unwrap().psi, 1.36);

    let geometries: Vec<Geometry> = analysis.geometries.iter().map(|g| g.geometry).collect();
    assert_eq!(
        geometries,
        vec![Geometry::YangMills, Geometry::NavierStokes, Geometry::PVsNp]
    );
    assert_eq!(analysis.primary_geometry(), Some(Geometry::YangMills));
}

#[test]
fn test_malformed_record_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{"name": "no components"}"#).unwrap();
    assert!(scan_file(&path).is_err());
}

#[test]
fn test_zero_expected_coverage_floors_to_one_article() {
    let a = analyze_coverage(&MediaCoverage::new(0, 0));
    assert_close!(a.lsse, 0.0);
    let b = analyze_coverage(&MediaCoverage::new(3, 0));
    assert_close!(b.lsse, 3.0);
    assert_eq!(b.status, CoverageStatus::AdequateCoverage);
}

#[test]
fn test_expected_coverage_estimate_scales_with_baseline() {
    assert_eq!(
        estimate_expected_coverage(50_000, 2_000_000, Baseline::Gaza),
        12_000
    );
    assert_eq!(estimate_expected_coverage(0, 0, Baseline::Ukraine), 100);
    assert_eq!(Baseline::from_name("GAZA"), Baseline::Gaza);
}

#[test]
fn test_components_are_clamped() {
    let record: CrisisRecord = serde_json::from_str(
        r#"{"components": {"severity": 4.0, "irreversibility": 1.0, "time_pressure": 1.0,
            "response_capacity": 0.0, "recovery_potential": 0.0}}"#,
    )
    .unwrap();
    let analysis = scan(&record);
    assert_close!(analysis.collapse.delta, 100.0);
    assert!(analysis.geometries.is_empty());
}
