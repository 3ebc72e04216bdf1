//! Longitudinal statistics over a single series.
//!
//! Standard deviation is the population form from [`utility::stddev`],
//! the same one the regional summaries use.

use serde::{Deserialize, Serialize};

use crate::analyzers::utility::{self, max, mean, min};
use crate::error::{FusionError, Result};
use crate::model::{Period, SourceSeries};

/// Slope cut-offs for [`TrendClass`]. Separate from the risk trend delta.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendThresholds {
    pub improving: f64,
    pub declining: f64,
}

impl Default for TrendThresholds {
    fn default() -> Self {
        Self {
            improving: 0.01,
            declining: -0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendClass {
    Improving,
    Declining,
    Stable,
}

/// Percent change from the first to the last value. `Undefined` when the
/// first value is zero; serialized as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PercentChange {
    Defined(f64),
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub period: Period,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub name: String,
    pub count: usize,
    pub first_period: Period,
    pub last_period: Period,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub percent_change: PercentChange,
    pub peak: Peak,
    /// Least-squares slope of value against period, per period.
    pub slope: f64,
    pub trend: TrendClass,
}

pub fn percent_change(first: f64, last: f64) -> PercentChange {
    if first == 0.0 {
        return PercentChange::Undefined;
    }
    PercentChange::Defined((last - first) / first * 100.0)
}

pub fn classify_slope(slope: f64, thresholds: &TrendThresholds) -> TrendClass {
    match slope {
        s if s > thresholds.improving => TrendClass::Improving,
        s if s < thresholds.declining => TrendClass::Declining,
        _ => TrendClass::Stable,
    }
}

/// # Errors
///
/// Returns [`FusionError::EmptySeries`] if `series` has no points.
pub fn summarize(series: &SourceSeries, thresholds: &TrendThresholds) -> Result<SeriesStats> {
    let points = series.points();
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err(FusionError::EmptySeries(series.name().to_string()));
    };

    let values = series.values();
    let periods: Vec<f64> = points.iter().map(|p| p.period as f64).collect();

    let avg = mean(&values);
    let slope = utility::slope(&periods, &values);

    let mut peak = *first;
    for p in &points[1..] {
        if p.value > peak.value {
            peak = *p;
        }
    }

    Ok(SeriesStats {
        name: series.name().to_string(),
        count: values.len(),
        first_period: first.period,
        last_period: last.period,
        mean: avg,
        min: min(&values),
        max: max(&values),
        std_dev: utility::stddev(&values, avg),
        percent_change: percent_change(first.value, last.value),
        peak: Peak {
            period: peak.period,
            value: peak.value,
        },
        slope,
        trend: classify_slope(slope, thresholds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(Period, f64)]) -> SourceSeries {
        SourceSeries::new("s", points.to_vec()).unwrap()
    }

    #[test]
    fn test_percent_change_zero_first_is_undefined() {
        assert_eq!(percent_change(0.0, 5.0), PercentChange::Undefined);
        assert_eq!(percent_change(0.0, 0.0), PercentChange::Undefined);
    }

    #[test]
    fn test_percent_change_defined() {
        assert_eq!(percent_change(2.0, 3.0), PercentChange::Defined(50.0));
        assert_eq!(percent_change(4.0, 3.0), PercentChange::Defined(-25.0));
    }

    #[test]
    fn test_undefined_serializes_as_null() {
        let json = serde_json::to_string(&PercentChange::Undefined).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn test_summarize() {
        let stats = summarize(
            &series(&[(2018, 10.0), (2019, 14.0), (2020, 12.0), (2021, 16.0)]),
            &TrendThresholds::default(),
        )
        .unwrap();

        assert_eq!(stats.count, 4);
        assert_eq!(stats.first_period, 2018);
        assert_eq!(stats.last_period, 2021);
        assert_eq!(stats.mean, 13.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 16.0);
        assert!((stats.std_dev - 5.0_f64.sqrt()).abs() < 1e-9);
        match stats.percent_change {
            PercentChange::Defined(pct) => assert!((pct - 60.0).abs() < 1e-9),
            PercentChange::Undefined => panic!("expected a defined change"),
        }
        assert_eq!(stats.peak.period, 2021);
        assert!((stats.slope - 1.6).abs() < 1e-9);
        assert_eq!(stats.trend, TrendClass::Improving);
    }

    #[test]
    fn test_peak_first_on_tie() {
        let stats = summarize(
            &series(&[(2018, 0.9), (2019, 0.2), (2020, 0.9)]),
            &TrendThresholds::default(),
        )
        .unwrap();
        assert_eq!(stats.peak.period, 2018);
    }

    #[test]
    fn test_trend_classes() {
        let t = TrendThresholds::default();
        assert_eq!(classify_slope(0.02, &t), TrendClass::Improving);
        assert_eq!(classify_slope(-0.02, &t), TrendClass::Declining);
        assert_eq!(classify_slope(0.01, &t), TrendClass::Stable);
        assert_eq!(classify_slope(-0.01, &t), TrendClass::Stable);
    }

    #[test]
    fn test_thresholds_are_tunable() {
        let loose = TrendThresholds {
            improving: 0.5,
            declining: -0.5,
        };
        assert_eq!(classify_slope(0.3, &loose), TrendClass::Stable);
    }

    #[test]
    fn test_single_point_is_stable() {
        let stats = summarize(&series(&[(2020, 0.4)]), &TrendThresholds::default()).unwrap();
        assert_eq!(stats.slope, 0.0);
        assert_eq!(stats.trend, TrendClass::Stable);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.percent_change, PercentChange::Defined(0.0));
    }

    #[test]
    fn test_zero_first_value_does_not_fail() {
        let stats = summarize(
            &series(&[(2019, 0.0), (2020, 3.0)]),
            &TrendThresholds::default(),
        )
        .unwrap();
        assert_eq!(stats.percent_change, PercentChange::Undefined);
    }

    #[test]
    fn test_empty_series() {
        let empty = SourceSeries::new("empty", vec![]).unwrap();
        assert!(matches!(
            summarize(&empty, &TrendThresholds::default()),
            Err(FusionError::EmptySeries(_))
        ));
    }
}
