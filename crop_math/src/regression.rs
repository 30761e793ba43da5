//! Least-squares linear regression
//!
//! A first-degree polynomial fit, used both for trend slopes over
//! `(index, price)` pairs and for the per-crop price models trained on
//! `(days, price)` pairs.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// A fitted line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    slope: f64,
    intercept: f64,
    r_squared: Option<f64>,
}

impl LinearRegression {
    /// Fit a line over `(index, value)` pairs, with indices `0..n`
    pub fn fit(values: &[f64]) -> Result<Self> {
        let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        Self::fit_xy(&xs, values)
    }

    /// Fit a line over explicit `(x, y)` pairs
    pub fn fit_xy(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(MathError::InvalidInput(format!(
                "x and y lengths differ ({} vs {})",
                xs.len(),
                ys.len()
            )));
        }
        if xs.len() < 2 {
            return Err(MathError::InsufficientData(
                "Not enough data for regression. Need at least 2 points.".to_string(),
            ));
        }

        let n = xs.len() as f64;
        let x_mean = xs.iter().sum::<f64>() / n;
        let y_mean = ys.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        let intercept = y_mean - slope * x_mean;

        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;
        for (&x, &y) in xs.iter().zip(ys) {
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - (slope * x + intercept)).powi(2);
        }
        let r_squared = (ss_total.abs() >= 1e-10).then(|| 1.0 - ss_residual / ss_total);

        Ok(Self {
            slope,
            intercept,
            r_squared,
        })
    }

    /// Build a line from known coefficients
    pub fn from_coefficients(slope: f64, intercept: f64) -> Self {
        Self {
            slope,
            intercept,
            r_squared: None,
        }
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficient of determination; `None` when the fitted values were constant
    pub fn r_squared(&self) -> Option<f64> {
        self.r_squared
    }

    /// Evaluate the line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
