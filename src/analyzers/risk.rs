use serde::Serialize;

/// Scores strictly above this are [`RiskTier::High`].
pub const HIGH_RISK_ABOVE: f64 = 0.6;
/// Scores strictly above this (and not High) are [`RiskTier::Medium`].
pub const MEDIUM_RISK_ABOVE: f64 = 0.4;
/// Minimum change between the two latest scores to count as a trend.
pub const TREND_DELTA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    /// Fewer than two periods.
    Unknown,
}

/// Maps a stress score to a risk tier.
///
/// | Score            | Tier   |
/// |------------------|--------|
/// | > 0.6            | High   |
/// | > 0.4 and <= 0.6 | Medium |
/// | <= 0.4           | Low    |
///
/// Boundary values fall to the lower tier.
pub fn classify(score: f64) -> RiskTier {
    match score {
        s if s > HIGH_RISK_ABOVE => RiskTier::High,
        s if s > MEDIUM_RISK_ABOVE => RiskTier::Medium,
        _ => RiskTier::Low,
    }
}

/// Direction of the change between the last two scores.
pub fn trend_direction(scores: &[f64]) -> TrendDirection {
    let [.., previous, latest] = scores else {
        return TrendDirection::Unknown;
    };

    match latest - previous {
        d if d > TREND_DELTA => TrendDirection::Increasing,
        d if d < -TREND_DELTA => TrendDirection::Decreasing,
        _ => TrendDirection::Stable,
    }
}
