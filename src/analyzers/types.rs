//! Result records handed to the presentation layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::importance::{ImportanceRanking, ModelSummary};
use crate::analyzers::risk::{RiskTier, TrendDirection};
use crate::analyzers::stress::StressWeights;
use crate::analyzers::trend::SeriesStats;
use crate::model::{ComputationNote, Period, SourceSeries};

// ---------------------------------------------------------------------------
// Regional aggregation
// ---------------------------------------------------------------------------

/// A selected region that reported zero samples for a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroSampleFlag {
    pub region: String,
    pub period: Period,
}

/// NDVI statistics for one selected region, over periods with samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    pub region: String,
    pub periods: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub avg_samples: f64,
    /// Mean reported within-period standard deviation, if any was reported.
    pub mean_spread: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionHighlight {
    pub region: String,
    pub value: f64,
}

/// Healthiest and most stressed region by mean NDVI, most variable by
/// standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionInsights {
    pub healthiest: RegionHighlight,
    pub most_stressed: RegionHighlight,
    pub most_variable: RegionHighlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalAggregate {
    pub series: SourceSeries,
    pub summaries: Vec<RegionSummary>,
    pub insights: Option<RegionInsights>,
    pub zero_sample: Vec<ZeroSampleFlag>,
    pub regions_without_samples: Vec<String>,
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// Inclusive period range shared by every required series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FusionWindow {
    pub start: Period,
    pub end: Period,
    pub periods: usize,
}

/// One joined period; `values` follows [`AlignedTable::columns`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRow {
    pub period: Period,
    pub values: Vec<f64>,
}

/// A context series kept at full length, next to its fusion-window subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineView {
    pub full: SourceSeries,
    pub windowed: SourceSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedTable {
    pub window: FusionWindow,
    pub columns: Vec<String>,
    pub rows: Vec<AlignedRow>,
    pub context: Vec<BaselineView>,
}

impl AlignedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn context_view(&self, name: &str) -> Option<&BaselineView> {
        self.context.iter().find(|v| v.full.name() == name)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// One scored period of the fusion window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressRecord {
    pub period: Period,
    pub env_signal: f64,
    pub acoustic_signal: Option<f64>,
    pub occurrence_count: f64,
    pub pressure_signal: f64,
    pub score: f64,
    pub tier: RiskTier,
    /// Score carried in the fusion table, if any, for comparison.
    pub reported_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressIndex {
    /// Weights actually used, after any renormalization.
    pub weights: StressWeights,
    pub records: Vec<StressRecord>,
    pub notes: Vec<ComputationNote>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub first_period: Option<Period>,
    pub last_period: Option<Period>,
    pub acoustic_observations: usize,
    pub mean_stress: f64,
}

/// Early-warning headline for the most recent scored period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestAssessment {
    pub period: Period,
    pub score: f64,
    pub tier: RiskTier,
    pub trend: TrendDirection,
}

/// Statistics of one context series over its full range and over the
/// fusion window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineSummary {
    pub name: String,
    pub full: SeriesStats,
    pub window: Option<SeriesStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusionReport {
    pub schema_version: u8,
    pub algorithm_version: u8,
    pub generated_at: DateTime<Utc>,
    pub window: FusionWindow,
    pub overview: Overview,
    pub latest: LatestAssessment,
    pub stress: StressIndex,
    pub stress_trend: SeriesStats,
    pub baselines: Vec<BaselineSummary>,
    pub regions: Option<RegionalAggregate>,
    pub drivers: Option<ImportanceRanking>,
    pub models: Option<ModelSummary>,
    pub notes: Vec<ComputationNote>,
}
