//! Dataset Loader/Validator.
//!
//! [`TableSource`] abstracts where tables live ([`DirSource`] for a data
//! directory, [`MemorySource`] for embedded CSV text). [`load_dataset`] reads
//! every table named in [`TableNames`], checks its schema and returns one
//! immutable [`Dataset`]. Only the fusion table is required; every other
//! source is `None` when absent and recorded in [`Dataset::notes`].

mod source;
mod tables;

pub use source::{DirSource, MemorySource, TableSource};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TableNames;
use crate::error::{FusionError, Result};
use crate::model::{
    AUDIO, BASELINE_RICHNESS, ComputationNote, DriverImportance, ModelResult, NDVI, OCCURRENCE,
    Period, REPORTED_STRESS, RICHNESS, RegionSample, SourceSeries,
};
use tables::{
    BASELINE_COLUMNS, BaselineRow, FUSION_COLUMNS, FusionRow, IMPORTANCE_COLUMNS, ImportanceRow,
    MODEL_COLUMNS, ModelRow, NDVI_POINT_COLUMNS, NdviPointRow, read_table,
};

/// Load outcome of one table, for availability reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceStatus {
    pub table: String,
    pub required: bool,
    /// Row count, or `None` if the table was absent.
    pub rows: Option<usize>,
}

/// Everything loaded from one set of inbound tables.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub ndvi: SourceSeries,
    pub acoustic: Option<SourceSeries>,
    pub occurrence: SourceSeries,
    pub richness: Option<SourceSeries>,
    pub reported_stress: Option<SourceSeries>,
    pub baseline: Option<SourceSeries>,
    pub region_samples: Option<Vec<RegionSample>>,
    pub model_results: Option<Vec<ModelResult>>,
    pub importance: Option<Vec<DriverImportance>>,
    pub sources: Vec<SourceStatus>,
    pub notes: Vec<ComputationNote>,
}

/// Loads and validates every table named in `tables`.
///
/// # Errors
///
/// - [`FusionError::MissingSource`] if the fusion table is absent.
/// - [`FusionError::Schema`] if any present table has missing columns,
///   unparseable cells, duplicate periods, or out-of-range values.
pub fn load_dataset(source: &dyn TableSource, tables: &TableNames) -> Result<Dataset> {
    let mut sources = Vec::new();
    let mut notes = Vec::new();

    let fusion_rows: Vec<FusionRow> = read_table(source, &tables.fusion, FUSION_COLUMNS)?
        .ok_or_else(|| FusionError::MissingSource(tables.fusion.clone()))?;
    tables::check_fusion_rows(&tables.fusion, &fusion_rows)?;
    record(&mut sources, &tables.fusion, true, Some(fusion_rows.len()));

    let ndvi = SourceSeries::new(NDVI, fusion_rows.iter().map(|r| (r.year, r.ndvi)).collect())?;
    let occurrence = SourceSeries::new(
        OCCURRENCE,
        fusion_rows
            .iter()
            .map(|r| (r.year, r.occurrence_count))
            .collect(),
    )?;
    let acoustic = optional_column(AUDIO, &fusion_rows, |r| r.audio_signal_strength)?;
    let richness = optional_column(RICHNESS, &fusion_rows, |r| r.species_per_1000_occ)?;
    let reported_stress = optional_column(REPORTED_STRESS, &fusion_rows, |r| r.eco_stress_index)?;

    if acoustic.is_none() {
        warn!(table = %tables.fusion, column = AUDIO, "Acoustic signal unavailable");
        notes.push(ComputationNote::Unavailable {
            source: format!("{}:{}", tables.fusion, AUDIO),
        });
    }

    let baseline = match read_table::<BaselineRow>(source, &tables.baseline, BASELINE_COLUMNS)? {
        Some(rows) => {
            record(&mut sources, &tables.baseline, false, Some(rows.len()));
            Some(SourceSeries::new(
                BASELINE_RICHNESS,
                rows.iter()
                    .map(|r| (r.year, r.species_per_1000_occ))
                    .collect(),
            )?)
        }
        None => {
            unavailable(&mut sources, &mut notes, &tables.baseline);
            None
        }
    };

    let region_samples =
        match read_table::<NdviPointRow>(source, &tables.ndvi_points, NDVI_POINT_COLUMNS)? {
            Some(rows) => {
                record(&mut sources, &tables.ndvi_points, false, Some(rows.len()));
                Some(tables::region_samples(&tables.ndvi_points, rows)?)
            }
            None => {
                unavailable(&mut sources, &mut notes, &tables.ndvi_points);
                None
            }
        };

    let model_results = match read_table::<ModelRow>(source, &tables.model_results, MODEL_COLUMNS)?
    {
        Some(rows) => {
            record(&mut sources, &tables.model_results, false, Some(rows.len()));
            Some(tables::model_results(&tables.model_results, rows)?)
        }
        None => {
            unavailable(&mut sources, &mut notes, &tables.model_results);
            None
        }
    };

    let importance = match read_table::<ImportanceRow>(
        source,
        &tables.feature_importance,
        IMPORTANCE_COLUMNS,
    )? {
        Some(rows) => {
            record(&mut sources, &tables.feature_importance, false, Some(rows.len()));
            Some(tables::driver_importances(&tables.feature_importance, rows)?)
        }
        None => {
            unavailable(&mut sources, &mut notes, &tables.feature_importance);
            None
        }
    };

    info!(
        periods = ndvi.len(),
        acoustic = acoustic.is_some(),
        baseline = baseline.is_some(),
        region_samples = region_samples.as_ref().map_or(0, Vec::len),
        "Dataset loaded"
    );

    Ok(Dataset {
        ndvi,
        acoustic,
        occurrence,
        richness,
        reported_stress,
        baseline,
        region_samples,
        model_results,
        importance,
        sources,
        notes,
    })
}

/// Builds a series from the non-empty cells of one optional column.
/// A column with no values at all is unavailable, not an empty series.
fn optional_column(
    name: &str,
    rows: &[FusionRow],
    cell: impl Fn(&FusionRow) -> Option<f64>,
) -> Result<Option<SourceSeries>> {
    let pairs: Vec<(Period, f64)> = rows
        .iter()
        .filter_map(|r| cell(r).map(|v| (r.year, v)))
        .collect();

    if pairs.is_empty() {
        return Ok(None);
    }

    debug!(column = name, values = pairs.len(), "Optional column present");
    Ok(Some(SourceSeries::new(name, pairs)?))
}

fn record(sources: &mut Vec<SourceStatus>, table: &str, required: bool, rows: Option<usize>) {
    debug!(table, rows, "Table read");
    sources.push(SourceStatus {
        table: table.to_string(),
        required,
        rows,
    });
}

fn unavailable(sources: &mut Vec<SourceStatus>, notes: &mut Vec<ComputationNote>, table: &str) {
    warn!(table, "Optional source unavailable");
    record(sources, table, false, None);
    notes.push(ComputationNote::Unavailable {
        source: table.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUSION: &str = "year,ndvi,audio_signal_strength,occurrence_count,species_per_1000_occ,eco_stress_index\n\
        2019,0.62,0.55,120,14.2,0.41\n\
        2018,0.60,,100,13.9,0.44\n\
        2020,0.58,0.50,150,13.1,0.47\n";

    fn tables() -> TableNames {
        TableNames::default()
    }

    #[test]
    fn test_missing_fusion_table() {
        let source = MemorySource::new();
        let err = load_dataset(&source, &tables()).unwrap_err();
        assert!(
            matches!(err, FusionError::MissingSource(ref t) if t == "fusion_multimodal_dataset.csv")
        );
    }

    #[test]
    fn test_fusion_only_marks_optionals_unavailable() {
        let source = MemorySource::new().with_table(&tables().fusion, FUSION);
        let data = load_dataset(&source, &tables()).unwrap();

        assert_eq!(data.ndvi.len(), 3);
        assert_eq!(data.ndvi.first_period(), Some(2018));
        assert_eq!(data.acoustic.as_ref().unwrap().len(), 2);
        assert!(data.baseline.is_none());
        assert!(data.region_samples.is_none());
        assert!(data.importance.is_none());
        assert_eq!(data.notes.len(), 4);
        assert_eq!(data.sources.len(), 5);
        assert!(data.sources[0].required);
        assert_eq!(data.sources[0].rows, Some(3));
    }

    #[test]
    fn test_acoustic_column_absent_is_unavailable() {
        let source = MemorySource::new().with_table(
            &tables().fusion,
            "year,ndvi,occurrence_count\n2019,0.6,10\n2020,0.5,12\n",
        );
        let data = load_dataset(&source, &tables()).unwrap();
        assert!(data.acoustic.is_none());
        assert!(data.notes.iter().any(|n| matches!(
            n,
            ComputationNote::Unavailable { source } if source.ends_with(AUDIO)
        )));
    }

    #[test]
    fn test_duplicate_year_in_fusion() {
        let source = MemorySource::new().with_table(
            &tables().fusion,
            "year,ndvi,occurrence_count\n2019,0.6,10\n2019,0.5,12\n",
        );
        assert!(matches!(
            load_dataset(&source, &tables()),
            Err(FusionError::Schema { .. })
        ));
    }

    #[test]
    fn test_negative_occurrence_rejected() {
        let source = MemorySource::new().with_table(
            &tables().fusion,
            "year,ndvi,occurrence_count\n2019,0.6,-3\n",
        );
        assert!(load_dataset(&source, &tables()).is_err());
    }

    #[test]
    fn test_bad_optional_table_fails_whole_load() {
        let source = MemorySource::new()
            .with_table(&tables().fusion, FUSION)
            .with_table(&tables().baseline, "year,species_per_1000_occ\n1990,x\n");
        assert!(matches!(
            load_dataset(&source, &tables()),
            Err(FusionError::Schema { ref table, .. }) if table == "biodiversity_baseline.csv"
        ));
    }

    #[test]
    fn test_nan_model_row_fails_load() {
        let source = MemorySource::new()
            .with_table(&tables().fusion, FUSION)
            .with_table(
                &tables().model_results,
                "model,rmse,r2\nLinear,0.05,0.2\nBroken,NaN,NaN\n",
            );
        assert!(matches!(
            load_dataset(&source, &tables()),
            Err(FusionError::Schema { ref table, .. }) if table == "model_results_summary.csv"
        ));
    }
}
