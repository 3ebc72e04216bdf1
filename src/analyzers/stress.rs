use crate::analyzers::risk::classify;
use crate::analyzers::types::{AlignedTable, StressIndex, StressRecord};
use crate::error::{FusionError, Result};
use crate::model::{AUDIO, ComputationNote, NDVI, OCCURRENCE, REPORTED_STRESS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Largest accepted distance between the weight sum and 1.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Component weights of the composite stress score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressWeights {
    pub env: f64,
    pub acoustic: f64,
    pub pressure: f64,
}

impl Default for StressWeights {
    fn default() -> Self {
        Self {
            env: 0.5,
            acoustic: 0.3,
            pressure: 0.2,
        }
    }
}

impl StressWeights {
    /// # Errors
    ///
    /// Returns [`FusionError::InvalidWeights`] if any weight is negative or
    /// not finite, or if the weights do not sum to 1.
    pub fn validate(&self) -> Result<()> {
        for (name, w) in [
            ("env", self.env),
            ("acoustic", self.acoustic),
            ("pressure", self.pressure),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(FusionError::InvalidWeights(format!(
                    "{name} weight must be a non-negative number, got {w}"
                )));
            }
        }

        let sum = self.env + self.acoustic + self.pressure;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(FusionError::InvalidWeights(format!(
                "weights must sum to 1, got {sum}"
            )));
        }
        Ok(())
    }

    /// Drops the acoustic term and rescales the others to sum to 1.
    fn without_acoustic(&self) -> Result<Self> {
        let rest = self.env + self.pressure;
        if rest <= 0.0 {
            return Err(FusionError::InvalidWeights(
                "acoustic signal unavailable and the remaining weights are zero".to_string(),
            ));
        }
        Ok(Self {
            env: self.env / rest,
            acoustic: 0.0,
            pressure: self.pressure / rest,
        })
    }
}

/// Computes the composite stress score for every row of `table`.
///
/// `score = w_env * (1 - env) + w_acoustic * (1 - acoustic) + w_pressure * pressure`
///
/// `pressure` is the occurrence count divided by the largest occurrence count
/// in the window, or 0 for every row when that maximum is 0. If the table has
/// no acoustic column, the acoustic term is dropped, the remaining weights are
/// rescaled and a [`ComputationNote::Degraded`] is recorded.
///
/// The result depends only on `table` and `weights`.
///
/// # Errors
///
/// - [`FusionError::InvalidWeights`] if `weights` fail validation.
/// - [`FusionError::MissingSource`] if the table lacks the vegetation or
///   occurrence column.
pub fn compute_stress(table: &AlignedTable, weights: &StressWeights) -> Result<StressIndex> {
    weights.validate()?;

    let env_col = table
        .column_index(NDVI)
        .ok_or_else(|| FusionError::MissingSource(NDVI.to_string()))?;
    let occ_col = table
        .column_index(OCCURRENCE)
        .ok_or_else(|| FusionError::MissingSource(OCCURRENCE.to_string()))?;
    let audio_col = table.column_index(AUDIO);

    let mut notes = Vec::new();
    let applied = match audio_col {
        Some(_) => *weights,
        None => {
            let rescaled = weights.without_acoustic()?;
            warn!(
                env = rescaled.env,
                pressure = rescaled.pressure,
                "Acoustic component skipped"
            );
            notes.push(ComputationNote::Degraded {
                component: "stress_index".to_string(),
                reason: format!(
                    "{AUDIO} unavailable; env and pressure weights rescaled to {:.3} and {:.3}",
                    rescaled.env, rescaled.pressure
                ),
            });
            rescaled
        }
    };

    let max_occurrence = table
        .rows
        .iter()
        .map(|r| r.values[occ_col])
        .fold(0.0, f64::max);

    if max_occurrence == 0.0 {
        debug!("No occurrences in window, pressure is 0 for every period");
    }

    let reported = table.context_view(REPORTED_STRESS).map(|v| &v.windowed);

    let records = table
        .rows
        .iter()
        .map(|row| {
            let env = row.values[env_col];
            let acoustic = audio_col.map(|c| row.values[c]);
            let occurrence = row.values[occ_col];
            let pressure = if max_occurrence > 0.0 {
                occurrence / max_occurrence
            } else {
                0.0
            };

            let score = applied.env * (1.0 - env)
                + applied.acoustic * (1.0 - acoustic.unwrap_or(1.0))
                + applied.pressure * pressure;

            StressRecord {
                period: row.period,
                env_signal: env,
                acoustic_signal: acoustic,
                occurrence_count: occurrence,
                pressure_signal: pressure,
                score,
                tier: classify(score),
                reported_score: reported.and_then(|s| s.value_at(row.period)),
            }
        })
        .collect();

    Ok(StressIndex {
        weights: applied,
        records,
        notes,
    })
}
