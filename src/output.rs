//! Output formatting and persistence for fusion reports.
//!
//! Supports pretty-printing, JSON files, and CSV export of scored periods.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::importance::ImportanceRanking;
use crate::analyzers::types::{FusionReport, RegionalAggregate, StressRecord};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Logs any result record using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs any result record as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the report as pretty JSON, replacing any existing file.
pub fn write_json(path: &str, report: &FusionReport) -> Result<()> {
    let file = create_file(path)?;
    serde_json::to_writer_pretty(file, report)?;
    info!(path, "Report written");
    Ok(())
}

/// Writes one CSV row per scored period, header included.
pub fn write_records_csv(path: &str, records: &[StressRecord]) -> Result<()> {
    let file = create_file(path)?;
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    debug!(path, rows = records.len(), "Scored records written");
    Ok(())
}

/// Creates `path` for writing, along with any missing parent directories.
fn create_file(path: &str) -> Result<File> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("creating {path}"))
}

/// Logs the headline figures of a report as structured fields.
pub fn log_summary(report: &FusionReport) {
    info!(
        window_start = report.window.start,
        window_end = report.window.end,
        periods = report.window.periods,
        mean_stress = report.overview.mean_stress,
        latest_period = report.latest.period,
        latest_score = report.latest.score,
        tier = ?report.latest.tier,
        trend = ?report.latest.trend,
        notes = report.notes.len(),
        "Fusion summary"
    );

    for baseline in &report.baselines {
        info!(
            series = %baseline.name,
            full_mean = baseline.full.mean,
            window_mean = baseline.window.as_ref().map(|w| w.mean),
            trend = ?baseline.full.trend,
            "Context series"
        );
    }

    if let Some(drivers) = &report.drivers {
        log_drivers(drivers);
    }
    if let Some(regions) = &report.regions {
        log_regions(regions);
    }
}

pub fn log_drivers(ranking: &ImportanceRanking) {
    for (rank, d) in ranking.drivers.iter().enumerate() {
        info!(
            rank = rank + 1,
            driver = %d.driver,
            share = d.share,
            "Driver"
        );
    }
    info!(category = ?ranking.category, "{}", ranking.narrative);
}

pub fn log_regions(aggregate: &RegionalAggregate) {
    for s in &aggregate.summaries {
        info!(
            region = %s.region,
            periods = s.periods,
            mean = s.mean,
            std_dev = s.std_dev,
            avg_samples = s.avg_samples,
            mean_spread = s.mean_spread,
            "Region"
        );
    }
    if let Some(insights) = &aggregate.insights {
        info!(
            healthiest = %insights.healthiest.region,
            most_stressed = %insights.most_stressed.region,
            most_variable = %insights.most_variable.region,
            "Region highlights"
        );
    }
    for flag in &aggregate.zero_sample {
        info!(region = %flag.region, period = flag.period, "Zero samples");
    }
}
