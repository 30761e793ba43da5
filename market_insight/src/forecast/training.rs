//! Fitting and evaluating per-crop price models

use super::model::{LinearTrendModel, ModelStore};
use crate::data::{DataStore, MarketRecord};
use crate::error::{MarketError, Result};
use crop_math::LinearRegression;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Crops with fewer records are not trained
pub const MIN_TRAINING_RECORDS: usize = 50;

/// Share of the most recent records held out for evaluation
pub const TEST_RATIO: f64 = 0.2;

/// Outcome of training one crop's model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub crop_type: String,
    pub records: usize,
    pub mae: f64,
    pub rmse: f64,
    pub path: PathBuf,
}

/// Error metrics of a prediction against actual values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastAccuracy {
    pub mae: f64,
    pub rmse: f64,
}

/// Split a series chronologically into training and test parts
pub fn train_test_split<T: Clone>(data: &[T], test_ratio: f64) -> (Vec<T>, Vec<T>) {
    if data.is_empty() || test_ratio <= 0.0 || test_ratio >= 1.0 {
        return (data.to_vec(), Vec::new());
    }

    let test_size = (data.len() as f64 * test_ratio).round() as usize;
    let train_size = data.len() - test_size;

    (data[..train_size].to_vec(), data[train_size..].to_vec())
}

/// Mean absolute and root mean squared error
pub fn forecast_accuracy(predicted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(MarketError::InvalidParameter(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = predicted.len() as f64;
    let errors: Vec<f64> = predicted.iter().zip(actual).map(|(p, a)| a - p).collect();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    Ok(ForecastAccuracy {
        mae,
        rmse: mse.sqrt(),
    })
}

fn features(model_origin: chrono::NaiveDate, records: &[MarketRecord]) -> (Vec<f64>, Vec<f64>) {
    records
        .iter()
        .map(|r| ((r.date - model_origin).num_days() as f64, r.price))
        .unzip()
}

/// Fit a model on one crop's date-ordered series
///
/// The model is scored on the most recent [`TEST_RATIO`] of the series, then
/// refitted on all of it.
pub fn fit_model(crop_type: &str, series: &[MarketRecord]) -> Result<LinearTrendModel> {
    let origin = series
        .first()
        .map(|r| r.date)
        .ok_or_else(|| MarketError::MissingData(format!("No data available for {}", crop_type)))?;

    let (train, test) = train_test_split(series, TEST_RATIO);
    let (train_x, train_y) = features(origin, &train);
    let holdout = LinearRegression::fit_xy(&train_x, &train_y)?;

    let accuracy = if test.is_empty() {
        ForecastAccuracy { mae: 0.0, rmse: 0.0 }
    } else {
        let (test_x, test_y) = features(origin, &test);
        let predicted: Vec<f64> = test_x.iter().map(|&x| holdout.predict(x)).collect();
        forecast_accuracy(&predicted, &test_y)?
    };

    let (all_x, all_y) = features(origin, series);
    let full = LinearRegression::fit_xy(&all_x, &all_y)?;

    let mut model = LinearTrendModel::new(crop_type, origin, &full);
    model.mae = accuracy.mae;
    model.rmse = accuracy.rmse;
    model.observations = series.len();
    Ok(model)
}

/// Train and save a model for every crop with enough history
pub fn train_models(store: &DataStore, models: &ModelStore) -> Result<Vec<TrainingReport>> {
    if store.market_records().is_empty() {
        return Err(MarketError::MissingData(
            "No market data available for training".to_string(),
        ));
    }

    let mut reports = Vec::new();
    for (crop, series) in store.series_iter() {
        if series.len() < MIN_TRAINING_RECORDS {
            info!("Not enough data for {}, skipping", crop);
            continue;
        }

        let model = fit_model(crop, series)?;
        let path = models.save_model(&model)?;
        info!(
            "{} model - MAE: {:.2}, RMSE: {:.2}, saved to {}",
            crop,
            model.mae,
            model.rmse,
            path.display()
        );

        reports.push(TrainingReport {
            crop_type: crop.to_string(),
            records: series.len(),
            mae: model.mae,
            rmse: model.rmse,
            path,
        });
    }

    info!("Model training completed: {} models", reports.len());
    Ok(reports)
}
