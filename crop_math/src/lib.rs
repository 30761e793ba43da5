//! # Crop Math
//!
//! Numeric kernels behind the crop market analytics.
//! This crate has no I/O: every function takes an ordered price (or value)
//! series and returns plain numbers or small report structs.
//!
//! - Descriptive statistics (mean, population/sample deviation, returns)
//! - Least-squares linear regression
//! - Trend direction and strength
//! - Annualized volatility and risk levels

use thiserror::Error;

pub mod regression;
pub mod stats;
pub mod trend;
pub mod volatility;

pub use regression::LinearRegression;
pub use trend::{growth_label, trend, TrendDirection, TrendReport};
pub use volatility::{annualized_volatility, volatility, RiskLevel, VolatilityReport};

/// Errors that can occur in the statistical kernels
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for crop math operations
pub type Result<T> = std::result::Result<T, MathError>;
