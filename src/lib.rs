//! # Agri Market
//!
//! Workspace facade for the crop market analytics crates.
//!
//! - [`crop_math`]: trend, volatility and regression kernels
//! - [`market_insight`]: data store, insights, forecasting, alerts and the
//!   `agri_market` command-line tool
//!
//! ## Example
//!
//! ```
//! use agri_market_workspace::crop_math::{trend, TrendDirection};
//!
//! let report = trend(&[100.0, 102.0, 104.0]);
//! assert_eq!(report.direction, TrendDirection::Up);
//! ```

pub use crop_math;
pub use market_insight;

pub use market_insight::{ApiResponse, AppConfig, MarketError, MarketService};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reexports() {
        let config = AppConfig::default();
        assert_eq!(config.forecast_days, 30);

        let report = crop_math::volatility(&[100.0, 100.0]);
        assert_eq!(report.value, 0.0);
    }
}
