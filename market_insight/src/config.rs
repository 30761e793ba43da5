//! Runtime configuration from environment variables

use std::env;
use std::path::PathBuf;

/// Thresholds used by the alert evaluator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Absolute day-over-day price change, in percent, that raises a price alert
    pub price_change_pct: f64,
    /// Annualized volatility above which a volatility alert is raised
    pub volatility: f64,
    /// Trend strength above which insight recommendations treat a trend as strong
    pub trend_change: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            price_change_pct: 10.0,
            volatility: 0.3,
            trend_change: 0.5,
        }
    }
}

/// Configuration for the market service
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the CSV datasets
    pub data_dir: PathBuf,

    /// Crop production CSV
    pub crop_data_path: PathBuf,

    /// Market price CSV
    pub market_data_path: PathBuf,

    /// Directory holding per-crop model files
    pub models_dir: PathBuf,

    /// Default forecast horizon in days
    pub forecast_days: usize,

    /// Default insight window in records
    pub insight_days: usize,

    /// Seed for the forecaster, weather simulation and data generator
    pub random_seed: Option<u64>,

    /// Alert thresholds
    pub thresholds: AlertThresholds,

    /// Location used when a weather request names none
    pub default_location: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            crop_data_path: data_dir.join("crop_data.csv"),
            market_data_path: data_dir.join("market_data.csv"),
            data_dir,
            models_dir: PathBuf::from("models"),
            forecast_days: 30,
            insight_days: 30,
            random_seed: None,
            thresholds: AlertThresholds::default(),
            default_location: "Delhi".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `AGRI_DATA_DIR` (default: data)
    /// - `AGRI_CROP_DATA` (default: <data dir>/crop_data.csv)
    /// - `AGRI_MARKET_DATA` (default: <data dir>/market_data.csv)
    /// - `AGRI_MODELS_DIR` (default: models)
    /// - `AGRI_FORECAST_DAYS` (default: 30)
    /// - `AGRI_INSIGHT_DAYS` (default: 30)
    /// - `AGRI_RANDOM_SEED` (default: unset, entropy-seeded)
    /// - `AGRI_PRICE_CHANGE_PCT` (default: 10)
    /// - `AGRI_VOLATILITY_THRESHOLD` (default: 0.3)
    /// - `AGRI_TREND_CHANGE` (default: 0.5)
    /// - `AGRI_DEFAULT_LOCATION` (default: Delhi)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let thresholds = AlertThresholds::default();

        let data_dir = env::var("AGRI_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Self {
            crop_data_path: env::var("AGRI_CROP_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("crop_data.csv")),

            market_data_path: env::var("AGRI_MARKET_DATA")
                .map(PathBuf::from)
                .unwrap_or_else(|_| data_dir.join("market_data.csv")),

            data_dir,

            models_dir: env::var("AGRI_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.models_dir),

            forecast_days: parse_var("AGRI_FORECAST_DAYS").unwrap_or(defaults.forecast_days),

            insight_days: parse_var("AGRI_INSIGHT_DAYS").unwrap_or(defaults.insight_days),

            random_seed: parse_var("AGRI_RANDOM_SEED"),

            thresholds: AlertThresholds {
                price_change_pct: parse_var("AGRI_PRICE_CHANGE_PCT")
                    .unwrap_or(thresholds.price_change_pct),
                volatility: parse_var("AGRI_VOLATILITY_THRESHOLD")
                    .unwrap_or(thresholds.volatility),
                trend_change: parse_var("AGRI_TREND_CHANGE").unwrap_or(thresholds.trend_change),
            },

            default_location: env::var("AGRI_DEFAULT_LOCATION")
                .unwrap_or(defaults.default_location),
        }
    }

    /// Configuration rooted at a directory, used by setup and tests
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let data_dir = root.join("data");
        Self {
            crop_data_path: data_dir.join("crop_data.csv"),
            market_data_path: data_dir.join("market_data.csv"),
            data_dir,
            models_dir: root.join("models"),
            ..Self::default()
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}
