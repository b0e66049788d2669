//! Numeric helpers shared by strategies and summaries.
//!
//! Undefined values are modelled as `None` rather than NaN.

/// Day-over-day fractional change: `p[i] / p[i-1] - 1`, `None` at index 0.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 || values[i - 1] == 0.0 {
            out.push(None);
        } else {
            out.push(Some(values[i] / values[i - 1] - 1.0));
        }
    }
    out
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom (0 = population, 1 = sample).
/// `None` when fewer than `ddof + 1` values are present.
pub fn std_dev(values: &[f64], ddof: usize) -> Option<f64> {
    if values.len() <= ddof {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values
        .iter()
        .map(|v| {
            let diff = v - m;
            diff * diff
        })
        .sum();
    Some((ss / (values.len() - ddof) as f64).sqrt())
}

/// Population z-scores. A series with zero spread scores 0 everywhere.
pub fn zscore(values: &[f64]) -> Vec<f64> {
    let (Some(m), Some(sd)) = (mean(values), std_dev(values, 0)) else {
        return Vec::new();
    };
    if sd == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - m) / sd).collect()
}

/// Round half away from zero to two decimals.
///
/// Exact halves go up in magnitude (0.125 -> 0.13), unlike banker's rounding
/// (0.125 -> 0.12) used by Python's `round`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
