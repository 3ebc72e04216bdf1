//! Stress scoring and trend analysis over aligned series.
//!
//! The pipeline in [`analyzer`] aggregates regional samples, aligns the
//! inbound series onto their common window, scores every aligned period,
//! and summarizes the result together with the precomputed driver and
//! model artifacts.

pub mod aggregate;
pub mod align;
pub mod analyzer;
pub mod importance;
pub mod risk;
pub mod stress;
pub mod trend;
pub mod types;
pub mod utility;
