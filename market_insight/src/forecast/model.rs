//! Trained per-crop price models and their on-disk store

use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use crop_math::LinearRegression;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A model mapping a calendar date to a predicted price
pub trait PriceModel: Debug + Send + Sync {
    /// Name of the model
    fn name(&self) -> &str;

    /// Predicted price on `date`
    fn predict(&self, date: NaiveDate) -> f64;
}

/// Linear regression of price on days elapsed since `origin`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrendModel {
    pub crop_type: String,
    /// First observed date; day 0 of the feature
    pub origin: NaiveDate,
    pub slope: f64,
    pub intercept: f64,
    /// Hold-out mean absolute error
    pub mae: f64,
    /// Hold-out root mean squared error
    pub rmse: f64,
    /// Observations the model was fitted on
    pub observations: usize,
}

impl LinearTrendModel {
    pub fn new(crop_type: &str, origin: NaiveDate, regression: &LinearRegression) -> Self {
        Self {
            crop_type: crop_type.to_string(),
            origin,
            slope: regression.slope(),
            intercept: regression.intercept(),
            mae: 0.0,
            rmse: 0.0,
            observations: 0,
        }
    }

    /// Feature value of a date: whole days since the origin
    pub fn feature(&self, date: NaiveDate) -> f64 {
        (date - self.origin).num_days() as f64
    }

    fn validate(&self, crop_type: &str) -> Result<()> {
        if self.crop_type != crop_type {
            return Err(MarketError::ModelLoad(format!(
                "model file for {} holds a model for {}",
                crop_type, self.crop_type
            )));
        }
        if !self.slope.is_finite() || !self.intercept.is_finite() {
            return Err(MarketError::ModelLoad(format!(
                "model for {} has non-finite coefficients",
                crop_type
            )));
        }
        Ok(())
    }
}

impl PriceModel for LinearTrendModel {
    fn name(&self) -> &str {
        "linear_trend"
    }

    fn predict(&self, date: NaiveDate) -> f64 {
        self.slope * self.feature(date) + self.intercept
    }
}

/// Directory of per-crop model files, `<crop>_model.json`
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, crop_type: &str) -> PathBuf {
        self.dir.join(format!("{}_model.json", crop_type))
    }

    /// Load one crop's model
    ///
    /// A missing file is `Ok(None)`; an unreadable or corrupt file is
    /// [`MarketError::ModelLoad`].
    pub fn load_model(&self, crop_type: &str) -> Result<Option<LinearTrendModel>> {
        let path = self.path_for(crop_type);
        if !path.exists() {
            debug!("No model file for {} at {}", crop_type, path.display());
            return Ok(None);
        }

        let text = fs::read_to_string(&path).map_err(|e| {
            MarketError::ModelLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let model: LinearTrendModel = serde_json::from_str(&text).map_err(|e| {
            MarketError::ModelLoad(format!("corrupt model {}: {}", path.display(), e))
        })?;
        model.validate(crop_type)?;

        Ok(Some(model))
    }

    /// Load every available model; failures are logged and skipped
    pub fn load_all(&self, crops: &[String]) -> HashMap<String, Arc<dyn PriceModel>> {
        let mut models: HashMap<String, Arc<dyn PriceModel>> = HashMap::new();
        for crop in crops {
            match self.load_model(crop) {
                Ok(Some(model)) => {
                    models.insert(crop.clone(), Arc::new(model));
                }
                Ok(None) => {}
                Err(e) => warn!("Skipping model for {}: {}", crop, e),
            }
        }
        info!("Loaded {} models", models.len());
        models
    }

    /// Write a model, creating the directory when needed
    pub fn save_model(&self, model: &LinearTrendModel) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&model.crop_type);
        fs::write(&path, serde_json::to_string_pretty(model)?)?;
        Ok(path)
    }

    /// True when the directory holds at least one model file
    pub fn has_models(&self) -> bool {
        fs::read_dir(&self.dir)
            .map(|entries| {
                entries.flatten().any(|entry| {
                    entry
                        .file_name()
                        .to_string_lossy()
                        .ends_with("_model.json")
                })
            })
            .unwrap_or(false)
    }
}
