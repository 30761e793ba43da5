//! Annualized volatility of a price series

use crate::stats::{pct_change, sample_std_dev};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading days used to annualize daily return deviation
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Volatility above which risk is high
pub const HIGH_RISK_THRESHOLD: f64 = 0.30;

/// Volatility above which risk is medium
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.15;

/// Risk bucket derived from annualized volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Both thresholds are strict: exactly 0.30 is medium, exactly 0.15 is low
    pub fn from_volatility(value: f64) -> Self {
        if value > HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if value > MEDIUM_RISK_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Result of [`volatility`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityReport {
    pub value: f64,
    pub risk_level: RiskLevel,
}

/// Sample deviation of day-over-day returns scaled by `sqrt(252)`
///
/// Returns 0 when fewer than two returns are available.
pub fn annualized_volatility(prices: &[f64]) -> f64 {
    let returns = pct_change(prices);
    match sample_std_dev(&returns) {
        Some(std) => std * TRADING_DAYS_PER_YEAR.sqrt(),
        None => 0.0,
    }
}

/// Annualized volatility with its risk bucket
pub fn volatility(prices: &[f64]) -> VolatilityReport {
    let value = annualized_volatility(prices);
    VolatilityReport {
        value,
        risk_level: RiskLevel::from_volatility(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_known_series() {
        let report = volatility(&[100.0, 105.0, 110.0, 90.0, 95.0]);
        assert!(report.value.is_finite());
        assert!(report.value >= 0.0);

        let returns = [0.05, 5.0 / 105.0, -20.0 / 110.0, 5.0 / 90.0];
        let mean = returns.iter().sum::<f64>() / 4.0;
        let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / 3.0;
        assert_relative_eq!(report.value, var.sqrt() * 252_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_constant_prices() {
        let report = volatility(&[10.0, 10.0, 10.0, 10.0]);
        assert_eq!(report.value, 0.0);
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[rstest]
    #[case(&[])]
    #[case(&[100.0])]
    #[case(&[100.0, 101.0])]
    fn test_short_series_is_zero(#[case] prices: &[f64]) {
        assert_eq!(annualized_volatility(prices), 0.0);
    }

    #[rstest]
    #[case(0.0, RiskLevel::Low)]
    #[case(0.15, RiskLevel::Low)]
    #[case(0.1500001, RiskLevel::Medium)]
    #[case(0.30, RiskLevel::Medium)]
    #[case(0.3000001, RiskLevel::High)]
    fn test_risk_boundaries(#[case] value: f64, #[case] expected: RiskLevel) {
        assert_eq!(RiskLevel::from_volatility(value), expected);
    }
}
