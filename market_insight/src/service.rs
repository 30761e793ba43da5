//! Facade wiring the data store, forecaster, weather simulation and alerts

use crate::alerts::{Alert, AlertEvaluator, DailySummary};
use crate::analysis::{self, CropPerformance, MarketAnalysis, MarketOverview};
use crate::config::AppConfig;
use crate::data::{CropQuery, CropRecord, DataStore, MarketQuery, MarketRecord};
use crate::error::Result;
use crate::export::{self, DatasetKind, Export, ExportFormat};
use crate::forecast::{train_models, Forecast, Forecaster, ModelStore, TrainingReport};
use crate::generate::DataGenerator;
use crate::insights::{self, InsightReport, PredictiveInsight};
use crate::notifications::{
    CustomAlertRequest, InMemoryNotificationStore, Notification, NotificationCenter,
    NotificationStore, TriggeredAlert,
};
use crate::recommend::{recommend_crops, CropSuggestion, SoilConditions};
use crate::weather::{self, DailyWeather, WeatherImpact, WeatherReading, WeatherService};
use chrono::{DateTime, Local};
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceFlags {
    pub weather: bool,
    pub analytics: bool,
    pub notifications: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub data_available: bool,
    pub models_loaded: usize,
    pub crop_records: usize,
    pub market_records: usize,
    pub last_updated: DateTime<Local>,
    pub services: ServiceFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherOutlook {
    pub location: String,
    pub forecast: Vec<DailyWeather>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpactReport {
    pub weather: WeatherReading,
    pub impact: WeatherImpact,
}

/// What `setup` did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupReport {
    pub data_generated: bool,
    pub crop_records: usize,
    pub market_records: usize,
    pub models_trained: usize,
}

/// Every operation of the backend over one loaded snapshot
///
/// `Send + Sync`: the tables are immutable, the random sources and the
/// notification log are lock-guarded.
#[derive(Debug)]
pub struct MarketService {
    config: AppConfig,
    store: Arc<DataStore>,
    models: ModelStore,
    forecaster: Forecaster,
    weather: WeatherService,
    alerts: AlertEvaluator,
    notifications: NotificationCenter,
}

impl MarketService {
    /// Load both tables and every saved model
    pub fn load(config: AppConfig) -> Self {
        let store = DataStore::load(&config);
        Self::with_store(config, store, Arc::new(InMemoryNotificationStore::new()))
    }

    /// Build around an existing snapshot and notification store
    pub fn with_store(
        config: AppConfig,
        store: DataStore,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        let models = ModelStore::new(&config.models_dir);
        let loaded = models.load_all(store.market_crops());
        Self {
            forecaster: Forecaster::with_models(loaded, config.random_seed),
            weather: WeatherService::new(config.random_seed),
            alerts: AlertEvaluator::new(config.thresholds),
            notifications: NotificationCenter::new(notifications),
            store: Arc::new(store),
            models,
            config,
        }
    }

    /// Generate missing data files, then train when no model exists
    pub fn setup(config: &AppConfig) -> Result<SetupReport> {
        let mut report = SetupReport {
            data_generated: false,
            crop_records: 0,
            market_records: 0,
            models_trained: 0,
        };

        if !config.crop_data_path.exists() || !config.market_data_path.exists() {
            info!("Data files missing, generating sample data");
            let (crops, market) = Self::generate(config)?;
            report.data_generated = true;
            report.crop_records = crops;
            report.market_records = market;
        }

        let models = ModelStore::new(&config.models_dir);
        if !models.has_models() {
            info!("No trained models found, training");
            let store = DataStore::load(config);
            report.models_trained = train_models(&store, &models)?.len();
        }

        Ok(report)
    }

    /// Overwrite both data files with synthetic data
    pub fn generate(config: &AppConfig) -> Result<(usize, usize)> {
        DataGenerator::new(config.random_seed)
            .write_datasets(&config.crop_data_path, &config.market_data_path)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<DataStore> {
        Arc::clone(&self.store)
    }

    /// Train on the loaded snapshot and start forecasting with the new models
    pub fn train(&mut self) -> Result<Vec<TrainingReport>> {
        let reports = train_models(&self.store, &self.models)?;
        for report in &reports {
            if let Some(model) = self.models.load_model(&report.crop_type)? {
                self.forecaster.register(&report.crop_type, Arc::new(model));
            }
        }
        Ok(reports)
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            data_available: self.store.has_data(),
            models_loaded: self.forecaster.models_loaded(),
            crop_records: self.store.crop_records().len(),
            market_records: self.store.market_records().len(),
            last_updated: Local::now(),
            services: ServiceFlags {
                weather: true,
                analytics: true,
                notifications: true,
            },
        }
    }

    pub fn health(&self) -> Health {
        Health {
            status: "healthy".to_string(),
            timestamp: Local::now(),
        }
    }

    pub fn market_data(&self, query: &MarketQuery) -> Vec<MarketRecord> {
        self.store.query_market(query)
    }

    pub fn crop_data(&self, query: &CropQuery) -> Vec<CropRecord> {
        self.store.query_crops(query)
    }

    pub fn market(&self, crop_type: Option<&str>) -> MarketOverview {
        analysis::market_overview(&self.store, crop_type)
    }

    pub fn analyze(&self, crop_type: Option<&str>, region: Option<&str>) -> MarketAnalysis {
        analysis::analyze(&self.store, crop_type, region)
    }

    /// Forecast a crop; `days` defaults to the configured horizon
    pub fn predict(&self, crop_type: &str, days: Option<usize>) -> Result<Forecast> {
        let horizon = days.unwrap_or(self.config.forecast_days);
        self.forecaster.forecast(&self.store, crop_type, horizon)
    }

    pub fn recommend(&self, conditions: &SoilConditions) -> Vec<CropSuggestion> {
        recommend_crops(conditions)
    }

    fn location<'a>(&'a self, location: Option<&'a str>) -> &'a str {
        location
            .filter(|l| !l.is_empty())
            .unwrap_or(self.config.default_location.as_str())
    }

    pub fn weather(&self, location: Option<&str>) -> WeatherReading {
        self.weather.current(self.location(location))
    }

    pub fn weather_forecast(&self, location: Option<&str>, days: usize) -> WeatherOutlook {
        WeatherOutlook {
            location: self.location(location).to_string(),
            forecast: self.weather.forecast(days),
        }
    }

    pub fn weather_impact(&self, location: Option<&str>, crop_type: &str) -> WeatherImpactReport {
        let reading = self.weather(location);
        let impact = weather::impact(&reading, crop_type);
        WeatherImpactReport {
            weather: reading,
            impact,
        }
    }

    /// Insight report; `days` defaults to the configured window
    pub fn insights(&self, crop_type: Option<&str>, days: Option<usize>) -> Result<InsightReport> {
        insights::market_insights(
            &self.store,
            crop_type,
            days.unwrap_or(self.config.insight_days),
            self.config.thresholds.trend_change,
        )
    }

    pub fn performance(&self, region: Option<&str>) -> Result<Vec<CropPerformance>> {
        analysis::crop_performance(&self.store, region)
    }

    pub fn predictions(&self, crop_type: &str, days_ahead: usize) -> Result<PredictiveInsight> {
        insights::predictive_insights(&self.store, crop_type, days_ahead)
    }

    pub fn notifications(&self, user_id: &str, limit: usize) -> Vec<Notification> {
        self.notifications.user_notifications(user_id, limit)
    }

    pub fn mark_read(&self, id: u64) -> Result<()> {
        self.notifications.mark_read(id)
    }

    /// Price, weather and volatility alerts against the current weather
    pub fn alerts(&self, location: Option<&str>, crop_type: &str) -> Vec<Alert> {
        let reading = self.weather(location);
        let mut alerts = self.alerts.check_price_alerts(&self.store);
        alerts.extend(self.alerts.check_weather_alerts(&reading, crop_type));
        alerts.extend(self.alerts.check_volatility_alerts(&self.store));
        alerts
    }

    pub fn daily_summary(&self, location: Option<&str>, crop_type: &str) -> DailySummary {
        let reading = self.weather(location);
        self.alerts
            .daily_summary(&self.store, Some(&reading), crop_type)
    }

    pub fn create_alert(
        &self,
        user_id: &str,
        request: &CustomAlertRequest,
    ) -> Result<Notification> {
        self.notifications.create_custom_alert(user_id, request)
    }

    pub fn check_custom_alerts(&self, location: Option<&str>) -> Vec<TriggeredAlert> {
        let reading = self.weather(location);
        self.notifications
            .check_custom_alerts(&self.store, Some(&reading))
    }

    pub fn export(&self, kind: DatasetKind, format: ExportFormat) -> Result<Export> {
        export::export(&self.store, kind, format)
    }
}
