//! Trend direction and strength of a price series

use crate::regression::LinearRegression;
use crate::stats::population_std_dev;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a fitted trend line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
    /// Fewer than two observations
    InsufficientData,
}

impl TrendDirection {
    fn from_slope(slope: f64) -> Self {
        if slope > 0.0 {
            TrendDirection::Up
        } else if slope < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        }
    }

    /// Label used for production and yield series
    pub fn growth_label(&self) -> &'static str {
        match self {
            TrendDirection::Up => "increasing",
            TrendDirection::Down => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::InsufficientData => "insufficient_data",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "up"),
            TrendDirection::Down => write!(f, "down"),
            TrendDirection::Stable => write!(f, "stable"),
            TrendDirection::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

/// Result of [`trend`]
///
/// `slope` and `strength` are absent when the series was too short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub direction: TrendDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope: Option<f64>,
}

impl TrendReport {
    /// Sentinel for series with fewer than two points
    pub fn insufficient() -> Self {
        Self {
            direction: TrendDirection::InsufficientData,
            strength: None,
            slope: None,
        }
    }

    /// True when the trend points in `direction` with strength above `threshold`
    pub fn is_strong(&self, direction: TrendDirection, threshold: f64) -> bool {
        self.direction == direction && self.strength.is_some_and(|s| s > threshold)
    }
}

/// Fit a least-squares line over `(index, price)` and classify it
///
/// Strength is `|slope|` relative to the population deviation of the prices,
/// and 0 when every price is equal.
pub fn trend(prices: &[f64]) -> TrendReport {
    if prices.len() < 2 {
        return TrendReport::insufficient();
    }

    let slope = match LinearRegression::fit(prices) {
        Ok(reg) => reg.slope(),
        Err(_) => return TrendReport::insufficient(),
    };

    let std = population_std_dev(prices);
    let strength = if std > 0.0 { slope.abs() / std } else { 0.0 };

    TrendReport {
        direction: TrendDirection::from_slope(slope),
        strength: Some(strength),
        slope: Some(slope),
    }
}

/// Growth label (`increasing`, `decreasing`, `stable`, `insufficient_data`) of a value series
pub fn growth_label(values: &[f64]) -> &'static str {
    trend(values).direction.growth_label()
}
