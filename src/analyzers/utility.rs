/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the population standard deviation given a pre-computed mean.
/// Returns 0.0 for empty input.
///
/// Every caller in the crate uses this population form.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Least-squares slope of `ys` against `xs`. Returns 0.0 when `xs` has no spread.
pub fn slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }

    let mx = mean(&xs[..n]);
    let my = mean(&ys[..n]);

    let (cov, var) = xs[..n]
        .iter()
        .zip(&ys[..n])
        .fold((0.0, 0.0), |(cov, var), (x, y)| {
            (cov + (x - mx) * (y - my), var + (x - mx).powi(2))
        });

    if var == 0.0 { 0.0 } else { cov / var }
}
