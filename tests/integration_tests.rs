use chrono::{TimeZone, Utc};
use ecofusion::analyzers::analyzer::{analyze, analyze_at};
use ecofusion::analyzers::importance::DriverCategory;
use ecofusion::analyzers::risk::{RiskTier, TrendDirection};
use ecofusion::config::{FusionConfig, RegionOrder};
use ecofusion::error::FusionError;
use ecofusion::loader::{Dataset, DirSource, load_dataset};
use ecofusion::model::{BASELINE_RICHNESS, ComputationNote, REGIONAL_NDVI};
use ecofusion::output::{write_json, write_records_csv};
use std::{env, fs};

const FULL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/full");
const MINIMAL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/minimal");
const WEIGHTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/weights.json");

fn load(dir: &str, config: &FusionConfig) -> Dataset {
    load_dataset(&DirSource::new(dir), &config.tables).expect("fixtures load")
}

fn with_regions(regions: &[&str]) -> FusionConfig {
    FusionConfig {
        regions: regions.iter().map(|r| r.to_string()).collect(),
        ..Default::default()
    }
}

#[test]
fn test_full_pipeline() {
    let config = with_regions(&["Amazon", "Borneo", "Congo"]);
    let report = analyze(&load(FULL, &config), &config).unwrap();

    // 2019 has no acoustic reading, so it drops out of the join.
    assert_eq!(report.window.start, 2018);
    assert_eq!(report.window.end, 2024);
    assert_eq!(report.window.periods, 6);
    let periods: Vec<i32> = report.stress.records.iter().map(|r| r.period).collect();
    assert_eq!(periods, vec![2018, 2020, 2021, 2022, 2023, 2024]);

    let first = &report.stress.records[0];
    assert!((first.pressure_signal - 0.4).abs() < 1e-9);
    assert!((first.score - 0.337).abs() < 1e-9);
    assert_eq!(first.tier, RiskTier::Low);
    assert_eq!(first.reported_score, Some(0.33));

    assert_eq!(report.latest.period, 2024);
    assert!((report.latest.score - 0.631).abs() < 1e-9);
    assert_eq!(report.latest.tier, RiskTier::High);
    assert_eq!(report.latest.trend, TrendDirection::Increasing);

    assert_eq!(report.overview.first_period, Some(2018));
    assert_eq!(report.overview.last_period, Some(2024));
    assert_eq!(report.overview.acoustic_observations, 6);
    assert_eq!(report.stress_trend.count, 6);
    assert!(report.notes.is_empty());
}

#[test]
fn test_baseline_keeps_full_range() {
    let config = FusionConfig::default();
    let report = analyze(&load(FULL, &config), &config).unwrap();

    let baseline = report
        .baselines
        .iter()
        .find(|b| b.name == BASELINE_RICHNESS)
        .unwrap();
    assert_eq!(baseline.full.first_period, 1990);
    assert_eq!(baseline.full.last_period, 2024);
    assert_eq!(baseline.full.count, 35);

    let window = baseline.window.as_ref().unwrap();
    assert_eq!(window.first_period, 2018);
    assert_eq!(window.last_period, 2024);
    assert_eq!(window.count, 7);
}

#[test]
fn test_regions_over_fixtures() {
    let config = with_regions(&["Congo", "Borneo", "Amazon"]);
    let report = analyze(&load(FULL, &config), &config).unwrap();
    let regions = report.regions.unwrap();

    let names: Vec<&str> = regions.summaries.iter().map(|s| s.region.as_str()).collect();
    assert_eq!(names, vec!["Amazon", "Borneo", "Congo"]);

    assert_eq!(regions.zero_sample.len(), 1);
    assert_eq!(regions.zero_sample[0].region, "Congo");
    assert_eq!(regions.zero_sample[0].period, 2020);
    assert!(regions.regions_without_samples.is_empty());

    let amazon = &regions.summaries[0];
    assert!((amazon.mean_spread.unwrap() - 0.14 / 3.0).abs() < 1e-9);

    let congo = &regions.summaries[2];
    assert_eq!(congo.periods, 2);
    assert!((congo.avg_samples - 11.0 / 3.0).abs() < 1e-9);

    // Congo's zero-sample row is left out of the 2020 mean.
    assert!((regions.series.value_at(2020).unwrap() - 0.705).abs() < 1e-9);

    let insights = regions.insights.unwrap();
    assert_eq!(insights.healthiest.region, "Amazon");
    assert_eq!(insights.most_stressed.region, "Borneo");

    let regional = report
        .baselines
        .iter()
        .find(|b| b.name == REGIONAL_NDVI)
        .unwrap();
    assert_eq!(regional.full.count, 3);
}

#[test]
fn test_drivers_and_models() {
    let config = FusionConfig::default();
    let report = analyze(&load(FULL, &config), &config).unwrap();

    let drivers = report.drivers.unwrap();
    let order: Vec<&str> = drivers.drivers.iter().map(|d| d.driver.as_str()).collect();
    assert_eq!(order, vec!["ndvi", "occurrence_count", "audio_signal_strength"]);
    assert!((drivers.top.share - 0.42).abs() < 1e-9);
    assert_eq!(drivers.category, DriverCategory::Vegetation);

    let models = report.models.unwrap();
    assert_eq!(models.best_model.as_deref(), Some("LinearRegression"));
    assert_eq!(models.negative_fit, vec!["RandomForest", "GradientBoosting"]);
    assert!(models.note.unwrap().contains("6 periods"));
}

#[test]
fn test_config_file_overrides_weights_and_order() {
    let config = FusionConfig::load(WEIGHTS).unwrap();
    assert_eq!(config.region_order, RegionOrder::Selection);

    let report = analyze(&load(FULL, &config), &config).unwrap();
    // 0.6 * 0.49 + 0.2 * 0.62 + 0.2 * 1.0
    assert!((report.latest.score - 0.618).abs() < 1e-9);

    let regions = report.regions.unwrap();
    let names: Vec<&str> = regions.summaries.iter().map(|s| s.region.as_str()).collect();
    assert_eq!(names, vec!["Congo", "Amazon"]);
}

#[test]
fn test_repeat_runs_are_identical() {
    let config = with_regions(&["Amazon", "Congo"]);
    let data = load(FULL, &config);
    let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let a = serde_json::to_string(&analyze_at(&data, &config, now).unwrap()).unwrap();
    let b = serde_json::to_string(&analyze_at(&data, &config, now).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_minimal_dataset_degrades() {
    let config = FusionConfig::default();
    let data = load(MINIMAL, &config);
    assert_eq!(data.sources.iter().filter(|s| s.rows.is_some()).count(), 1);

    let report = analyze(&data, &config).unwrap();
    assert_eq!(report.notes.len(), 6);
    assert!(
        report
            .notes
            .iter()
            .any(|n| matches!(n, ComputationNote::Degraded { .. }))
    );

    let latest = report.stress.records.last().unwrap();
    assert_eq!(latest.pressure_signal, 0.0);
    assert_eq!(latest.acoustic_signal, None);
    assert!((latest.score - 0.5 / 0.7 * 0.43).abs() < 1e-9);
    assert!(report.drivers.is_none());
    assert!(report.regions.is_none());
}

#[test]
fn test_regions_without_point_table() {
    let config = with_regions(&["Amazon"]);
    let err = analyze(&load(MINIMAL, &config), &config).unwrap_err();
    assert!(matches!(err, FusionError::MissingSource(ref t) if t == &config.tables.ndvi_points));
}

#[test]
fn test_unknown_region() {
    let config = with_regions(&["Amazon", "Atlantis"]);
    let err = analyze(&load(FULL, &config), &config).unwrap_err();
    assert!(matches!(err, FusionError::UnknownRegion(ref r) if r == "Atlantis"));
}

#[test]
fn test_missing_data_dir() {
    let dir = format!("{}/ecofusion_no_such_dir", env::temp_dir().display());
    let err = load_dataset(&DirSource::new(dir), &FusionConfig::default().tables).unwrap_err();
    assert!(matches!(err, FusionError::MissingSource(_)));
}

#[test]
fn test_report_files() {
    let config = FusionConfig::default();
    let report = analyze(&load(FULL, &config), &config).unwrap();

    let json_path = format!("{}/ecofusion_it_report.json", env::temp_dir().display());
    let csv_path = format!("{}/ecofusion_it_records.csv", env::temp_dir().display());

    write_json(&json_path, &report).unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(value["schema_version"], 1);
    assert_eq!(value["latest"]["tier"], "High");
    assert_eq!(value["window"]["start"], 2018);

    write_records_csv(&csv_path, &report.stress.records).unwrap();
    assert_eq!(fs::read_to_string(&csv_path).unwrap().lines().count(), 7);

    fs::remove_file(&json_path).unwrap();
    fs::remove_file(&csv_path).unwrap();
}
