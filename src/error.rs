//! Error taxonomy for the fusion core.
//!
//! Structural and configuration problems are returned as [`FusionError`] and
//! abort the computation. Degenerate numeric states (a zero first value for
//! percent change, an all-zero occurrence window) are not errors; they resolve
//! to sentinel values inside the analyzers.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("required source '{0}' is missing")]
    MissingSource(String),

    #[error("schema error in '{table}': {message}")]
    Schema { table: String, message: String },

    #[error("no region selected")]
    NoRegionSelected,

    #[error("selected region '{0}' has no samples in the point-sampling table")]
    UnknownRegion(String),

    #[error("required series do not overlap: {0}")]
    NoOverlap(String),

    #[error("invalid stress weights: {0}")]
    InvalidWeights(String),

    #[error("no driver importances supplied")]
    EmptyImportanceSet,

    #[error("driver importances sum to {0}, shares are undefined")]
    NonPositiveTotal(f64),

    #[error("driver '{driver}' has invalid importance {value}")]
    InvalidImportance { driver: String, value: f64 },

    #[error("series '{0}' has no values")]
    EmptySeries(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FusionError {
    pub(crate) fn schema(table: &str, message: impl Into<String>) -> Self {
        FusionError::Schema {
            table: table.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FusionError>;
