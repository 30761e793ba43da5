//! # Market Insight
//!
//! Backend for agricultural market analytics over synthetic CSV datasets.
//!
//! ## Features
//!
//! - Crop and market tables loaded once, indexed per crop
//! - Market summaries, seasonality and buy/sell/hold recommendations
//! - Price forecasts from trained per-crop models, with a naive fallback
//! - Price, weather, volatility and user-defined alerts
//! - Simulated weather and rule-based crop suggestions
//! - Synthetic data generation and CSV/JSON export
//!
//! ## Example
//!
//! ```no_run
//! use market_insight::{AppConfig, ApiResponse, MarketService};
//!
//! let service = MarketService::load(AppConfig::from_env());
//! let response = ApiResponse::from_result(service.predict("wheat", Some(7)));
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! ```

pub mod alerts;
pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod forecast;
pub mod generate;
pub mod insights;
pub mod notifications;
pub mod recommend;
pub mod response;
pub mod service;
pub mod weather;

pub use alerts::{Alert, AlertEvaluator, AlertKind, Comparison, CustomCondition, Severity};
pub use config::{AlertThresholds, AppConfig};
pub use data::{CropRecord, DataLoader, DataStore, MarketRecord, PRICE_FLOOR};
pub use error::{MarketError, Result};
pub use forecast::{Forecast, ForecastMethod, Forecaster, ModelStore, PriceModel};
pub use insights::{market_insights, predictive_insights, InsightReport};
pub use notifications::{InMemoryNotificationStore, NotificationCenter, NotificationStore};
pub use response::ApiResponse;
pub use service::MarketService;
pub use weather::{WeatherReading, WeatherService};
