//! Row types and schema checks for each inbound table.

use std::collections::HashSet;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::source::TableSource;
use crate::error::{FusionError, Result};
use crate::model::{DriverImportance, ModelResult, NDVI, OCCURRENCE, Period, RICHNESS, RegionSample};

pub(crate) const FUSION_COLUMNS: &[&str] = &["year", NDVI, OCCURRENCE];
pub(crate) const BASELINE_COLUMNS: &[&str] = &["year", RICHNESS];
pub(crate) const NDVI_POINT_COLUMNS: &[&str] = &["region", "year", "ndvi_mean", "num_samples"];
pub(crate) const MODEL_COLUMNS: &[&str] = &["model", "rmse", "r2"];
pub(crate) const IMPORTANCE_COLUMNS: &[&str] = &["feature", "importance"];

/// One row of the fusion table. Empty optional cells stay `None`.
#[derive(Debug, Deserialize)]
pub(crate) struct FusionRow {
    pub(crate) year: Period,
    pub(crate) ndvi: f64,
    #[serde(default)]
    pub(crate) audio_signal_strength: Option<f64>,
    pub(crate) occurrence_count: f64,
    #[serde(default)]
    pub(crate) species_per_1000_occ: Option<f64>,
    #[serde(default)]
    pub(crate) eco_stress_index: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BaselineRow {
    pub(crate) year: Period,
    pub(crate) species_per_1000_occ: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NdviPointRow {
    region: String,
    year: Period,
    #[serde(default)]
    ndvi_mean: Option<f64>,
    #[serde(default)]
    ndvi_std: Option<f64>,
    num_samples: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModelRow {
    model: String,
    rmse: f64,
    r2: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImportanceRow {
    feature: String,
    importance: f64,
}

/// Reads and deserializes `table`, checking `required` columns first.
///
/// Returns `Ok(None)` if the source does not have the table.
pub(crate) fn read_table<T: DeserializeOwned>(
    source: &dyn TableSource,
    table: &str,
    required: &[&str],
) -> Result<Option<Vec<T>>> {
    let Some(reader) = source.open(table)? else {
        return Ok(None);
    };

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| FusionError::schema(table, e.to_string()))?
        .clone();

    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(FusionError::schema(
                table,
                format!("missing column '{column}'"),
            ));
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: T = result.map_err(|e| FusionError::schema(table, e.to_string()))?;
        rows.push(row);
    }

    Ok(Some(rows))
}

pub(crate) fn check_fusion_rows(table: &str, rows: &[FusionRow]) -> Result<()> {
    if let Some(row) = rows.iter().find(|r| r.occurrence_count < 0.0) {
        return Err(FusionError::schema(
            table,
            format!("negative {OCCURRENCE} at period {}", row.year),
        ));
    }
    Ok(())
}

pub(crate) fn region_samples(table: &str, rows: Vec<NdviPointRow>) -> Result<Vec<RegionSample>> {
    let mut seen = HashSet::new();
    let mut samples = Vec::with_capacity(rows.len());

    for row in rows {
        if !seen.insert((row.region.clone(), row.year)) {
            return Err(FusionError::schema(
                table,
                format!("duplicate sample for region '{}' in {}", row.region, row.year),
            ));
        }

        match row.ndvi_mean {
            Some(v) if !v.is_finite() => {
                return Err(FusionError::schema(
                    table,
                    format!("non-finite ndvi_mean for '{}' in {}", row.region, row.year),
                ));
            }
            None if row.num_samples > 0 => {
                return Err(FusionError::schema(
                    table,
                    format!(
                        "ndvi_mean missing for '{}' in {} despite {} samples",
                        row.region, row.year, row.num_samples
                    ),
                ));
            }
            _ => {}
        }

        if let Some(std) = row.ndvi_std.filter(|s| !s.is_finite() || *s < 0.0) {
            return Err(FusionError::schema(
                table,
                format!("ndvi_std for '{}' in {} must be >= 0, got {std}", row.region, row.year),
            ));
        }

        samples.push(RegionSample {
            region: row.region,
            period: row.year,
            value: row.ndvi_mean,
            spread: row.ndvi_std,
            sample_count: row.num_samples,
        });
    }

    Ok(samples)
}

pub(crate) fn model_results(table: &str, rows: Vec<ModelRow>) -> Result<Vec<ModelResult>> {
    rows.into_iter()
        .map(|r| {
            if !r.rmse.is_finite() || !r.r2.is_finite() {
                return Err(FusionError::schema(
                    table,
                    format!("non-finite score for model '{}': rmse {}, r2 {}", r.model, r.rmse, r.r2),
                ));
            }
            Ok(ModelResult {
                model: r.model,
                rmse: r.rmse,
                r2: r.r2,
            })
        })
        .collect()
}

pub(crate) fn driver_importances(
    table: &str,
    rows: Vec<ImportanceRow>,
) -> Result<Vec<DriverImportance>> {
    rows.into_iter()
        .map(|r| {
            if !r.importance.is_finite() || r.importance < 0.0 {
                return Err(FusionError::schema(
                    table,
                    format!("importance of '{}' must be >= 0, got {}", r.feature, r.importance),
                ));
            }
            Ok(DriverImportance {
                driver: r.feature,
                importance: r.importance,
            })
        })
        .collect()
}
