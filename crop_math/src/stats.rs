//! Descriptive statistics over price series
//!
//! Trend strength divides by the population deviation; volatility,
//! forecasting and seasonality use the sample deviation.

use statrs::statistics::Statistics;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Population standard deviation (divides by `n`), 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let std = values.iter().population_std_dev();
    if std.is_finite() {
        std
    } else {
        0.0
    }
}

/// Sample standard deviation (divides by `n - 1`), `None` below two values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let std = values.iter().std_dev();
    std.is_finite().then_some(std)
}

/// Fractional change between consecutive values
///
/// Pairs whose previous value is zero are skipped.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Smallest value, `None` for an empty slice
pub fn min_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Largest value, `None` for an empty slice
pub fn max_value(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_deviation_conventions() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(population_std_dev(&values), 2.0, epsilon = 1e-12);
        assert_relative_eq!(
            sample_std_dev(&values).unwrap(),
            2.138089935299395,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_short_inputs() {
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(population_std_dev(&[5.0]), 0.0);
        assert_eq!(sample_std_dev(&[5.0]), None);
        assert!(pct_change(&[5.0]).is_empty());
    }

    #[test]
    fn test_pct_change() {
        let returns = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1, epsilon = 1e-12);
        assert_relative_eq!(returns[1], -0.1, epsilon = 1e-12);

        // zero base is skipped rather than producing infinity
        assert_eq!(pct_change(&[0.0, 1.0, 2.0]), vec![1.0]);
    }

    #[test]
    fn test_extremes_and_rounding() {
        let values = [3.0, -1.0, 7.5];
        assert_eq!(min_value(&values), Some(-1.0));
        assert_eq!(max_value(&values), Some(7.5));
        assert_eq!(min_value(&[]), None);
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.675, 1), 2.7);
    }
}
