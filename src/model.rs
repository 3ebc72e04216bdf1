//! Core data model shared by the loader and every analyzer.
//!
//! Everything here is an immutable value. Series are validated once, at
//! construction, and downstream components only ever derive new values from
//! them.

use serde::Serialize;

use crate::error::{FusionError, Result};

/// The universal time axis: one integer year.
pub type Period = i32;

// ---------------------------------------------------------------------------
// Signal names
// ---------------------------------------------------------------------------

/// Normalized vegetation index from the fusion table (health, higher = healthier).
pub const NDVI: &str = "ndvi";
/// Bioacoustic activity strength (health, higher = healthier).
pub const AUDIO: &str = "audio_signal_strength";
/// Raw occurrence record count (observation effort).
pub const OCCURRENCE: &str = "occurrence_count";
/// Sampling-corrected species richness from the fusion table.
pub const RICHNESS: &str = "species_per_1000_occ";
/// Precomputed composite score carried in the fusion table.
pub const REPORTED_STRESS: &str = "eco_stress_index";
/// Long-baseline species richness.
pub const BASELINE_RICHNESS: &str = "baseline_species_per_1000_occ";
/// Region-wide NDVI mean built from the point-sampling table.
pub const REGIONAL_NDVI: &str = "regional_ndvi";

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period: Period,
    pub value: f64,
}

/// A named sequence of `(period, value)` pairs.
///
/// Periods are unique and strictly increasing; values are finite. Both are
/// enforced by [`SourceSeries::new`], the only constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSeries {
    name: String,
    points: Vec<SeriesPoint>,
}

impl SourceSeries {
    /// Builds a series from unordered pairs, sorting by period.
    ///
    /// # Errors
    ///
    /// Returns [`FusionError::Schema`] if a period appears twice or a value is
    /// NaN or infinite.
    pub fn new(name: impl Into<String>, pairs: Vec<(Period, f64)>) -> Result<Self> {
        let name = name.into();
        let mut points: Vec<SeriesPoint> = pairs
            .into_iter()
            .map(|(period, value)| SeriesPoint { period, value })
            .collect();

        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(FusionError::schema(
                &name,
                format!("non-finite value at period {}", bad.period),
            ));
        }

        points.sort_by_key(|p| p.period);

        if let Some(dup) = points.windows(2).find(|w| w[0].period == w[1].period) {
            return Err(FusionError::schema(
                &name,
                format!("duplicate period {}", dup[0].period),
            ));
        }

        Ok(Self { name, points })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn first_period(&self) -> Option<Period> {
        self.points.first().map(|p| p.period)
    }

    pub fn last_period(&self) -> Option<Period> {
        self.points.last().map(|p| p.period)
    }

    pub fn value_at(&self, period: Period) -> Option<f64> {
        self.points
            .binary_search_by_key(&period, |p| p.period)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// Returns a new series holding only the points with `start <= period <= end`.
    pub fn within(&self, start: Period, end: Period) -> SourceSeries {
        SourceSeries {
            name: self.name.clone(),
            points: self
                .points
                .iter()
                .filter(|p| p.period >= start && p.period <= end)
                .copied()
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Point samples and external artifacts
// ---------------------------------------------------------------------------

/// One region's NDVI sample for one period, before aggregation.
///
/// `value` is `None` only when `sample_count` is zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSample {
    pub region: String,
    pub period: Period,
    pub value: Option<f64>,
    pub spread: Option<f64>,
    pub sample_count: u32,
}

/// A precomputed driver importance (external model artifact).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverImportance {
    pub driver: String,
    pub importance: f64,
}

/// One row of the precomputed model-comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelResult {
    pub model: String,
    pub rmse: f64,
    pub r2: f64,
}

/// Records a computation that ran with less than its full inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComputationNote {
    /// An optional source was absent.
    Unavailable { source: String },
    /// A component was skipped or computed from partial inputs.
    Degraded { component: String, reason: String },
}
