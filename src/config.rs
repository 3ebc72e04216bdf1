//! Run configuration.
//!
//! Stored as a JSON object on disk. Every field is optional:
//! ```json
//! {
//!   "weights": { "env": 0.5, "acoustic": 0.3, "pressure": 0.2 },
//!   "trend": { "improving": 0.01, "declining": -0.01 },
//!   "regions": ["Agumbe", "Silent Valley"],
//!   "region_order": "alphabetical",
//!   "tables": { "fusion": "fusion_multimodal_dataset.csv" }
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::analyzers::stress::StressWeights;
use crate::analyzers::trend::TrendThresholds;

/// How per-region summaries are ordered. Ties in best/worst/most-variable
/// selection go to the region that comes first in this order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrder {
    #[default]
    Alphabetical,
    /// Keep the order in which regions were selected.
    Selection,
}

/// File names of the inbound tables, relative to the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    pub fusion: String,
    pub baseline: String,
    pub ndvi_points: String,
    pub model_results: String,
    pub feature_importance: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            fusion: "fusion_multimodal_dataset.csv".to_string(),
            baseline: "biodiversity_baseline.csv".to_string(),
            ndvi_points: "ndvi_temporal_dataset_POINT_SAMPLING.csv".to_string(),
            model_results: "model_results_summary.csv".to_string(),
            feature_importance: "feature_importance.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub weights: StressWeights,
    pub trend: TrendThresholds,
    /// Regions to aggregate. Empty means no regional aggregation was requested.
    pub regions: Vec<String>,
    pub region_order: RegionOrder,
    pub tables: TableNames,
}

impl FusionConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{path}'"))?;
        Self::from_json(&content).with_context(|| format!("invalid config '{path}'"))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}
