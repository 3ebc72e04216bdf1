//! Ranking of precomputed driver importances and the model comparison
//! summary. Both inputs are external model artifacts used only to explain
//! the score.

use crate::error::{FusionError, Result};
use crate::model::{DriverImportance, ModelResult};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverShare {
    pub driver: String,
    pub importance: f64,
    /// Fraction of the total importance, in [0, 1].
    pub share: f64,
}

/// Signal family of a driver, used to pick explanatory text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriverCategory {
    Vegetation,
    Acoustic,
    Sampling,
    Other,
}

impl DriverCategory {
    pub fn from_driver(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if ["ndvi", "veg", "evi"].iter().any(|k| name.contains(k)) {
            DriverCategory::Vegetation
        } else if ["audio", "acoustic", "bird", "sound"]
            .iter()
            .any(|k| name.contains(k))
        {
            DriverCategory::Acoustic
        } else if ["occ", "sampling", "observation", "gbif", "species"]
            .iter()
            .any(|k| name.contains(k))
        {
            DriverCategory::Sampling
        } else {
            DriverCategory::Other
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            DriverCategory::Vegetation => {
                "Vegetation health (NDVI) is the strongest driver of biodiversity change."
            }
            DriverCategory::Acoustic => {
                "Bird acoustic activity is the strongest driver of biodiversity change."
            }
            DriverCategory::Sampling => {
                "Observation effort is the strongest driver; trends may reflect sampling bias."
            }
            DriverCategory::Other => "The strongest driver falls outside the known signal families.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportanceRanking {
    /// Sorted by descending share; equal shares keep input order.
    pub drivers: Vec<DriverShare>,
    pub top: DriverShare,
    pub category: DriverCategory,
    pub narrative: String,
}

/// Converts raw importances to shares of the total and sorts them.
///
/// # Errors
///
/// - [`FusionError::EmptyImportanceSet`] if `importances` is empty.
/// - [`FusionError::InvalidImportance`] for a negative or non-finite value.
/// - [`FusionError::NonPositiveTotal`] if the values sum to zero.
pub fn rank_drivers(importances: &[DriverImportance]) -> Result<ImportanceRanking> {
    if importances.is_empty() {
        return Err(FusionError::EmptyImportanceSet);
    }

    if let Some(bad) = importances
        .iter()
        .find(|d| !d.importance.is_finite() || d.importance < 0.0)
    {
        return Err(FusionError::InvalidImportance {
            driver: bad.driver.clone(),
            value: bad.importance,
        });
    }

    let total: f64 = importances.iter().map(|d| d.importance).sum();
    if total <= 0.0 {
        return Err(FusionError::NonPositiveTotal(total));
    }

    let mut drivers: Vec<DriverShare> = importances
        .iter()
        .map(|d| DriverShare {
            driver: d.driver.clone(),
            importance: d.importance,
            share: d.importance / total,
        })
        .collect();
    drivers.sort_by(|a, b| b.share.partial_cmp(&a.share).unwrap_or(Ordering::Equal));

    let top = drivers[0].clone();
    let category = DriverCategory::from_driver(&top.driver);

    Ok(ImportanceRanking {
        drivers,
        top,
        category,
        narrative: category.narrative().to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub results: Vec<ModelResult>,
    /// Lowest finite error; the first listed wins ties.
    pub best_model: Option<String>,
    /// Models whose goodness-of-fit is below zero.
    pub negative_fit: Vec<String>,
    pub note: Option<String>,
}

/// Summarizes the model comparison table. `periods` is the number of
/// periods the models could have been fitted on.
pub fn summarize_models(results: &[ModelResult], periods: usize) -> ModelSummary {
    let best_model = results
        .iter()
        .filter(|r| r.rmse.is_finite())
        .fold(None::<&ModelResult>, |best, r| match best {
            Some(b) if b.rmse <= r.rmse => Some(b),
            _ => Some(r),
        })
        .map(|r| r.model.clone());

    let negative_fit: Vec<String> = results
        .iter()
        .filter(|r| r.r2 < 0.0)
        .map(|r| r.model.clone())
        .collect();

    let note = (!negative_fit.is_empty()).then(|| {
        format!("negative R² is expected with only {periods} periods of data")
    });

    ModelSummary {
        results: results.to_vec(),
        best_model,
        negative_fit,
        note,
    }
}
