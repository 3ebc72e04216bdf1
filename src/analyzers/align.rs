use crate::analyzers::types::{AlignedRow, AlignedTable, BaselineView, FusionWindow};
use crate::error::{FusionError, Result};
use crate::model::SourceSeries;
use tracing::{debug, info};

/// Joins `required` series by period and windows `context` series.
///
/// The fusion window runs from the latest first period to the earliest last
/// period across `required`. A row is kept only for periods inside the window
/// that every required series has (inner join). Context series are never
/// truncated: each keeps its full range and gains a windowed copy next to it.
///
/// # Errors
///
/// Returns [`FusionError::NoOverlap`] if the join has no rows.
pub fn align(required: &[&SourceSeries], context: &[&SourceSeries]) -> Result<AlignedTable> {
    let Some(lead) = required.first() else {
        return Err(FusionError::NoOverlap("no required series".to_string()));
    };

    let mut start = i32::MIN;
    let mut end = i32::MAX;
    for series in required {
        match (series.first_period(), series.last_period()) {
            (Some(first), Some(last)) => {
                start = start.max(first);
                end = end.min(last);
            }
            _ => {
                return Err(FusionError::NoOverlap(format!(
                    "series '{}' is empty",
                    series.name()
                )));
            }
        }
    }

    let mut rows = Vec::new();
    for point in lead.points() {
        if point.period < start || point.period > end {
            continue;
        }
        let values: Option<Vec<f64>> = required.iter().map(|s| s.value_at(point.period)).collect();
        match values {
            Some(values) => rows.push(AlignedRow {
                period: point.period,
                values,
            }),
            None => debug!(period = point.period, "Period missing from a required series"),
        }
    }

    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        let names: Vec<&str> = required.iter().map(|s| s.name()).collect();
        return Err(FusionError::NoOverlap(format!(
            "no common period across {}",
            names.join(", ")
        )));
    };

    let window = FusionWindow {
        start: first.period,
        end: last.period,
        periods: rows.len(),
    };

    let context = context
        .iter()
        .map(|s| BaselineView {
            full: (*s).clone(),
            windowed: s.within(window.start, window.end),
        })
        .collect();

    info!(
        start = window.start,
        end = window.end,
        periods = window.periods,
        "Fusion window"
    );

    Ok(AlignedTable {
        window,
        columns: required.iter().map(|s| s.name().to_string()).collect(),
        rows,
        context,
    })
}
