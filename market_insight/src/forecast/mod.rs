//! Price forecasting
//!
//! A crop with a registered [`PriceModel`] is projected by that model; every
//! other crop gets the naive forecast, sampled from a normal distribution
//! around its recent average.

pub mod model;
pub mod training;

pub use model::{LinearTrendModel, ModelStore, PriceModel};
pub use training::{fit_model, train_models, TrainingReport};

use crate::data::{prices, DataStore, MarketRecord};
use crate::error::{MarketError, Result};
use chrono::{Days, NaiveDate};
use crop_math::stats::{mean, round_to, sample_std_dev};
use crop_math::MathError;
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Records averaged by the naive forecast
pub const RECENT_WINDOW: usize = 30;

/// Sampled prices never fall below this share of the recent average
pub const PRICE_FLOOR_RATIO: f64 = 0.5;

/// Share of the recent deviation used as the sampling deviation
pub const NOISE_SCALE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastMethod {
    MlModel,
    SimpleForecast,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub predicted_price: f64,
}

/// Projected prices for the days following the last observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub crop_type: String,
    pub predictions: Vec<PricePoint>,
    pub method: ForecastMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_std: Option<f64>,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.predictions.iter().map(|p| p.predicted_price).collect()
    }
}

/// Forecaster holding the trained models and a shared random source
#[derive(Debug)]
pub struct Forecaster {
    models: HashMap<String, Arc<dyn PriceModel>>,
    rng: Mutex<StdRng>,
}

impl Forecaster {
    /// A forecaster without models; `seed` makes the naive path reproducible
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_models(HashMap::new(), seed)
    }

    pub fn with_models(models: HashMap<String, Arc<dyn PriceModel>>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            models,
            rng: Mutex::new(rng),
        }
    }

    /// Register or replace the model of one crop
    pub fn register(&mut self, crop_type: &str, model: Arc<dyn PriceModel>) {
        self.models.insert(crop_type.to_string(), model);
    }

    pub fn has_model(&self, crop_type: &str) -> bool {
        self.models.contains_key(crop_type)
    }

    pub fn models_loaded(&self) -> usize {
        self.models.len()
    }

    /// Forecast `horizon` days after the crop's last observation
    ///
    /// A crop without records is [`MarketError::MissingData`].
    pub fn forecast(&self, store: &DataStore, crop_type: &str, horizon: usize) -> Result<Forecast> {
        if store.market_records().is_empty() {
            return Err(MarketError::MissingData(
                "No market data available".to_string(),
            ));
        }
        let series = store
            .series(crop_type)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MarketError::MissingData(format!("No data available for {}", crop_type))
            })?;

        let dates = future_dates(series, horizon)?;

        if let Some(model) = self.models.get(crop_type) {
            match model_forecast(crop_type, model.as_ref(), &dates) {
                Some(forecast) => return Ok(forecast),
                None => warn!(
                    "Model {} produced non-finite prices for {}, using simple forecast",
                    model.name(),
                    crop_type
                ),
            }
        }

        self.simple_forecast(crop_type, series, dates)
    }

    fn simple_forecast(
        &self,
        crop_type: &str,
        series: &[MarketRecord],
        dates: Vec<NaiveDate>,
    ) -> Result<Forecast> {
        let recent = prices(&series[series.len().saturating_sub(RECENT_WINDOW)..]);
        let avg = mean(&recent).ok_or_else(|| {
            MarketError::MissingData("No data available for forecasting".to_string())
        })?;
        let std = sample_std_dev(&recent).unwrap_or(0.0);
        let floor = avg * PRICE_FLOOR_RATIO;

        let normal = Normal::new(avg, std * NOISE_SCALE)
            .map_err(|e| MathError::CalculationError(e.to_string()))?;

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let predictions = dates
            .into_iter()
            .map(|date| PricePoint {
                date,
                predicted_price: normal.sample(&mut *rng).max(floor),
            })
            .collect();

        debug!("Simple forecast for {} around {:.2}", crop_type, avg);
        Ok(Forecast {
            crop_type: crop_type.to_string(),
            predictions,
            method: ForecastMethod::SimpleForecast,
            average_price: Some(round_to(avg, 2)),
            price_std: Some(round_to(std, 2)),
        })
    }
}

fn model_forecast(
    crop_type: &str,
    model: &dyn PriceModel,
    dates: &[NaiveDate],
) -> Option<Forecast> {
    let mut predictions = Vec::with_capacity(dates.len());
    for &date in dates {
        let price = model.predict(date);
        if !price.is_finite() {
            return None;
        }
        predictions.push(PricePoint {
            date,
            predicted_price: price,
        });
    }

    Some(Forecast {
        crop_type: crop_type.to_string(),
        predictions,
        method: ForecastMethod::MlModel,
        average_price: None,
        price_std: None,
    })
}

/// The `horizon` calendar days after the last record
fn future_dates(series: &[MarketRecord], horizon: usize) -> Result<Vec<NaiveDate>> {
    let last = series
        .last()
        .map(|r| r.date)
        .ok_or_else(|| MarketError::MissingData("empty series".to_string()))?;
    let out_of_range =
        || MarketError::InvalidParameter(format!("horizon of {} days is out of range", horizon));

    let room = NaiveDate::MAX.signed_duration_since(last).num_days();
    if i64::try_from(horizon).map_or(true, |h| h > room) {
        return Err(out_of_range());
    }

    (1..=horizon as u64)
        .map(|offset| last.checked_add_days(Days::new(offset)).ok_or_else(out_of_range))
        .collect()
}
