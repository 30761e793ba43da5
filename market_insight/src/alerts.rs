//! Rule-based alerts over prices, weather and volatility

use crate::config::AlertThresholds;
use crate::data::{prices, DataStore};
use crate::error::{MarketError, Result};
use crate::weather::WeatherReading;
use chrono::{DateTime, Local};
use crop_math::annualized_volatility;
use crop_math::stats::{mean, round_to};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Records looked at by the volatility check
pub const VOLATILITY_WINDOW: usize = 7;

/// Price moves above this percentage are high severity
pub const HIGH_PRICE_CHANGE_PCT: f64 = 20.0;

const HEAT_LIMIT: f64 = 35.0;
const FROST_LIMIT: f64 = 5.0;
const HEAVY_RAIN: f64 = 50.0;
const DRY_RAIN: f64 = 5.0;
const DRY_HUMIDITY: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Price,
    Weather,
    Volatility,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub crop: String,
    pub message: String,
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

impl Alert {
    fn new(kind: AlertKind, crop: &str, message: String, severity: Severity) -> Self {
        Self {
            kind,
            crop: crop.to_string(),
            message,
            severity,
            timestamp: Local::now(),
            current_price: None,
            price_change: None,
            volatility: None,
        }
    }
}

/// Comparison operator of a custom alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
}

impl Comparison {
    pub fn evaluate(self, value: f64, threshold: f64) -> bool {
        match self {
            Comparison::Greater => value > threshold,
            Comparison::Less => value < threshold,
            Comparison::GreaterOrEqual => value >= threshold,
            Comparison::LessOrEqual => value <= threshold,
            Comparison::Equal => value == threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Greater => ">",
            Comparison::Less => "<",
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
            Comparison::Equal => "==",
        }
    }
}

impl FromStr for Comparison {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            ">" => Ok(Comparison::Greater),
            "<" => Ok(Comparison::Less),
            ">=" => Ok(Comparison::GreaterOrEqual),
            "<=" => Ok(Comparison::LessOrEqual),
            "==" => Ok(Comparison::Equal),
            other => Err(MarketError::InvalidParameter(format!(
                "unknown operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Value a custom alert watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertField {
    /// Latest price of the rule's crop
    Price,
    /// Current temperature
    Temperature,
}

impl FromStr for AlertField {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "price" | "price_threshold" => Ok(AlertField::Price),
            "temperature" | "weather_condition" => Ok(AlertField::Temperature),
            other => Err(MarketError::InvalidParameter(format!(
                "unknown alert field '{}'",
                other
            ))),
        }
    }
}

/// `field operator threshold`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomCondition {
    pub field: AlertField,
    pub operator: Comparison,
    pub threshold: f64,
}

impl CustomCondition {
    pub fn parse(field: &str, operator: &str, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() {
            return Err(MarketError::InvalidParameter(
                "threshold must be a finite number".to_string(),
            ));
        }
        Ok(Self {
            field: field.parse()?,
            operator: operator.parse()?,
            threshold,
        })
    }
}

/// True when `value` satisfies the condition
pub fn custom_alert(condition: &CustomCondition, value: f64) -> bool {
    condition.operator.evaluate(value, condition.threshold)
}

/// Short digest of one crop's day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub crop: String,
    pub timestamp: DateTime<Local>,
    pub summary: Vec<String>,
}

/// Evaluates alert rules against configured thresholds
#[derive(Debug, Clone, Default)]
pub struct AlertEvaluator {
    thresholds: AlertThresholds,
}

impl AlertEvaluator {
    pub fn new(thresholds: AlertThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &AlertThresholds {
        &self.thresholds
    }

    /// Compare each crop's last two prices
    pub fn check_price_alerts(&self, store: &DataStore) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for (crop, series) in store.series_iter() {
            let [.., previous, current] = series else {
                continue;
            };

            // Compared at nine decimal places
            let change = round_to((current.price - previous.price) / previous.price * 100.0, 9);
            if change.abs() < self.thresholds.price_change_pct {
                continue;
            }

            let direction = if change > 0.0 { "increased" } else { "decreased" };
            let severity = if change.abs() > HIGH_PRICE_CHANGE_PCT {
                Severity::High
            } else {
                Severity::Medium
            };
            let mut alert = Alert::new(
                AlertKind::Price,
                crop,
                format!("{} price {} by {:.1}%", crop, direction, change.abs()),
                severity,
            );
            alert.current_price = Some(round_to(current.price, 2));
            alert.price_change = Some(round_to(change, 2));
            alerts.push(alert);
        }
        alerts
    }

    /// Heat, frost, waterlogging and drought rules
    pub fn check_weather_alerts(&self, weather: &WeatherReading, crop: &str) -> Vec<Alert> {
        let temp = weather.temperature;
        let rain = weather.rainfall;
        let mut alerts = Vec::new();

        if temp > HEAT_LIMIT {
            alerts.push(Alert::new(
                AlertKind::Weather,
                crop,
                format!("High temperature alert: {}°C - Monitor crop stress", temp),
                Severity::High,
            ));
        }
        if temp < FROST_LIMIT {
            alerts.push(Alert::new(
                AlertKind::Weather,
                crop,
                format!("Low temperature alert: {}°C - Risk of frost damage", temp),
                Severity::High,
            ));
        }
        if rain > HEAVY_RAIN {
            alerts.push(Alert::new(
                AlertKind::Weather,
                crop,
                format!("Heavy rainfall alert: {}mm - Check for waterlogging", rain),
                Severity::Medium,
            ));
        }
        if rain < DRY_RAIN && weather.humidity < DRY_HUMIDITY {
            alerts.push(Alert::new(
                AlertKind::Weather,
                crop,
                "Drought conditions: Low rainfall and humidity - Consider irrigation".to_string(),
                Severity::High,
            ));
        }

        alerts
    }

    /// Annualized volatility of each crop's last week
    pub fn check_volatility_alerts(&self, store: &DataStore) -> Vec<Alert> {
        let mut alerts = Vec::new();
        for (crop, series) in store.series_iter() {
            if series.len() < VOLATILITY_WINDOW {
                continue;
            }

            let recent = prices(&series[series.len() - VOLATILITY_WINDOW..]);
            let volatility = annualized_volatility(&recent);
            if volatility > self.thresholds.volatility {
                let mut alert = Alert::new(
                    AlertKind::Volatility,
                    crop,
                    format!(
                        "High volatility detected for {}: {:.1}% - Market is unstable",
                        crop,
                        volatility * 100.0
                    ),
                    Severity::Medium,
                );
                alert.volatility = Some(round_to(volatility, 3));
                alerts.push(alert);
            }
        }
        alerts
    }

    /// Price position, temperature and rainfall for one crop
    pub fn daily_summary(
        &self,
        store: &DataStore,
        weather: Option<&WeatherReading>,
        crop: &str,
    ) -> DailySummary {
        let mut summary = Vec::new();

        if let Some(series) = store.series(crop) {
            if let (Some(last), Some(avg)) = (series.last(), mean(&prices(series))) {
                let position = if last.price > avg { "above" } else { "below" };
                summary.push(format!(
                    "Current price ({:.2}) is {} average",
                    last.price, position
                ));
            }
        }

        if let Some(weather) = weather {
            summary.push(format!("Current temperature: {}°C", weather.temperature));
            if weather.rainfall > 0.0 {
                summary.push(format!("Rainfall: {}mm", weather.rainfall));
            }
        }

        DailySummary {
            crop: crop.to_string(),
            timestamp: Local::now(),
            summary,
        }
    }
}
