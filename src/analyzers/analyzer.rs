use crate::analyzers::aggregate::aggregate_regions;
use crate::analyzers::align::align;
use crate::analyzers::importance::{rank_drivers, summarize_models};
use crate::analyzers::risk::trend_direction;
use crate::analyzers::stress::compute_stress;
use crate::analyzers::trend::summarize;
use crate::analyzers::types::{BaselineSummary, FusionReport, LatestAssessment, Overview};
use crate::analyzers::utility::mean;
use crate::config::FusionConfig;
use crate::error::{FusionError, Result};
use crate::loader::Dataset;
use crate::model::SourceSeries;
use chrono::{DateTime, Utc};
use tracing::info;

/// Name of the computed stress score series in trend statistics.
pub const STRESS_SCORE: &str = "stress_score";

/// Runs the full pipeline on a loaded dataset, stamped with the current time.
pub fn analyze(dataset: &Dataset, config: &FusionConfig) -> Result<FusionReport> {
    analyze_at(dataset, config, Utc::now())
}

/// Runs the full pipeline on a loaded dataset.
///
/// Weights are validated before anything else. When `config.regions` is
/// non-empty the point-sampling table becomes required and its aggregate is
/// reported and windowed like the other context series. Apart from
/// `generated_at`, the report is a pure function of `dataset` and `config`.
pub fn analyze_at(
    dataset: &Dataset,
    config: &FusionConfig,
    generated_at: DateTime<Utc>,
) -> Result<FusionReport> {
    config.weights.validate()?;

    let regions = if config.regions.is_empty() {
        None
    } else {
        let samples = dataset
            .region_samples
            .as_ref()
            .ok_or_else(|| FusionError::MissingSource(config.tables.ndvi_points.clone()))?;
        Some(aggregate_regions(
            samples,
            &config.regions,
            config.region_order,
        )?)
    };

    let mut required: Vec<&SourceSeries> = vec![&dataset.ndvi, &dataset.occurrence];
    if let Some(acoustic) = &dataset.acoustic {
        required.push(acoustic);
    }

    let context: Vec<&SourceSeries> = [
        dataset.baseline.as_ref(),
        dataset.richness.as_ref(),
        dataset.reported_stress.as_ref(),
        regions.as_ref().map(|r| &r.series),
    ]
    .into_iter()
    .flatten()
    .collect();

    let table = align(&required, &context)?;
    let stress = compute_stress(&table, &config.weights)?;

    let scores: Vec<f64> = stress.records.iter().map(|r| r.score).collect();
    let stress_series = SourceSeries::new(
        STRESS_SCORE,
        stress.records.iter().map(|r| (r.period, r.score)).collect(),
    )?;
    let stress_trend = summarize(&stress_series, &config.trend)?;

    let latest = stress
        .records
        .last()
        .map(|r| LatestAssessment {
            period: r.period,
            score: r.score,
            tier: r.tier,
            trend: trend_direction(&scores),
        })
        .ok_or_else(|| FusionError::EmptySeries(STRESS_SCORE.to_string()))?;

    let mut baselines = Vec::new();
    for view in &table.context {
        if view.full.is_empty() {
            continue;
        }
        let window = if view.windowed.is_empty() {
            None
        } else {
            Some(summarize(&view.windowed, &config.trend)?)
        };
        baselines.push(BaselineSummary {
            name: view.full.name().to_string(),
            full: summarize(&view.full, &config.trend)?,
            window,
        });
    }

    let drivers = dataset
        .importance
        .as_deref()
        .map(rank_drivers)
        .transpose()?;

    let models = dataset
        .model_results
        .as_deref()
        .map(|results| summarize_models(results, table.window.periods));

    let overview = Overview {
        first_period: dataset.ndvi.first_period(),
        last_period: dataset.ndvi.last_period(),
        acoustic_observations: dataset.acoustic.as_ref().map_or(0, SourceSeries::len),
        mean_stress: mean(&scores),
    };

    let mut notes = dataset.notes.clone();
    notes.extend(stress.notes.iter().cloned());

    info!(
        period = latest.period,
        score = latest.score,
        tier = ?latest.tier,
        trend = ?latest.trend,
        "Latest assessment"
    );

    Ok(FusionReport {
        schema_version: 1,
        algorithm_version: 1,
        generated_at,
        window: table.window,
        overview,
        latest,
        stress,
        stress_trend,
        baselines,
        regions,
        drivers,
        models,
        notes,
    })
}
