use crate::analyzers::types::{
    RegionHighlight, RegionInsights, RegionSummary, RegionalAggregate, ZeroSampleFlag,
};
use crate::analyzers::utility::{max, mean, min, stddev};
use crate::config::RegionOrder;
use crate::error::{FusionError, Result};
use crate::model::{Period, REGIONAL_NDVI, RegionSample, SourceSeries};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

/// Collapses per-region NDVI samples into one region-wide series.
///
/// Each period's value is the mean over selected regions that have at least
/// one sample in that period. Periods with no qualifying region are omitted.
/// Selected rows with a zero sample count are excluded and reported in
/// [`RegionalAggregate::zero_sample`].
///
/// Also summarizes each selected region (mean, min, max, population standard
/// deviation, mean sample count) and picks the healthiest, most stressed and
/// most variable region. Ties go to the region that comes first in `order`.
///
/// # Errors
///
/// - [`FusionError::NoRegionSelected`] if `selection` is empty.
/// - [`FusionError::UnknownRegion`] if a selected region has no rows at all.
pub fn aggregate_regions(
    samples: &[RegionSample],
    selection: &[String],
    order: RegionOrder,
) -> Result<RegionalAggregate> {
    if selection.is_empty() {
        return Err(FusionError::NoRegionSelected);
    }

    let mut regions: Vec<&str> = Vec::new();
    for name in selection {
        if !regions.contains(&name.as_str()) {
            regions.push(name.as_str());
        }
    }
    if order == RegionOrder::Alphabetical {
        regions.sort_unstable();
    }

    let mut by_region: HashMap<&str, Vec<&RegionSample>> = HashMap::new();
    for sample in samples {
        if regions.contains(&sample.region.as_str()) {
            by_region.entry(sample.region.as_str()).or_default().push(sample);
        }
    }

    if let Some(missing) = regions.iter().find(|r| !by_region.contains_key(*r)) {
        return Err(FusionError::UnknownRegion(missing.to_string()));
    }

    let mut per_period: BTreeMap<Period, Vec<f64>> = BTreeMap::new();
    let mut zero_sample = Vec::new();
    let mut summaries = Vec::new();
    let mut regions_without_samples = Vec::new();

    for region in &regions {
        let mut rows = by_region.remove(region).unwrap_or_default();
        rows.sort_by_key(|s| s.period);

        let mut values = Vec::new();
        let mut spreads = Vec::new();
        for row in &rows {
            match row.value {
                Some(v) if row.sample_count > 0 => {
                    per_period.entry(row.period).or_default().push(v);
                    values.push(v);
                    spreads.extend(row.spread);
                }
                _ => zero_sample.push(ZeroSampleFlag {
                    region: region.to_string(),
                    period: row.period,
                }),
            }
        }

        if values.is_empty() {
            regions_without_samples.push(region.to_string());
            continue;
        }

        let counts: Vec<f64> = rows.iter().map(|r| r.sample_count as f64).collect();
        let avg = mean(&values);

        summaries.push(RegionSummary {
            region: region.to_string(),
            periods: values.len(),
            mean: avg,
            min: min(&values),
            max: max(&values),
            std_dev: stddev(&values, avg),
            avg_samples: mean(&counts),
            mean_spread: (!spreads.is_empty()).then(|| mean(&spreads)),
        });
    }

    if !zero_sample.is_empty() {
        warn!(
            flagged = zero_sample.len(),
            "Selected regions have periods without samples"
        );
    }

    let series = SourceSeries::new(
        REGIONAL_NDVI,
        per_period
            .into_iter()
            .map(|(period, values)| (period, mean(&values)))
            .collect(),
    )?;

    let insights = region_insights(&summaries);

    info!(
        regions = regions.len(),
        periods = series.len(),
        "Regional aggregation complete"
    );

    Ok(RegionalAggregate {
        series,
        summaries,
        insights,
        zero_sample,
        regions_without_samples,
    })
}

/// Picks best/worst/most-variable regions. Only a strictly better value
/// displaces the current pick, so the first region in order wins ties.
fn region_insights(summaries: &[RegionSummary]) -> Option<RegionInsights> {
    let first = summaries.first()?;
    let mut healthiest = first;
    let mut most_stressed = first;
    let mut most_variable = first;

    for s in &summaries[1..] {
        if s.mean > healthiest.mean {
            healthiest = s;
        }
        if s.mean < most_stressed.mean {
            most_stressed = s;
        }
        if s.std_dev > most_variable.std_dev {
            most_variable = s;
        }
    }

    Some(RegionInsights {
        healthiest: RegionHighlight {
            region: healthiest.region.clone(),
            value: healthiest.mean,
        },
        most_stressed: RegionHighlight {
            region: most_stressed.region.clone(),
            value: most_stressed.mean,
        },
        most_variable: RegionHighlight {
            region: most_variable.region.clone(),
            value: most_variable.std_dev,
        },
    })
}
