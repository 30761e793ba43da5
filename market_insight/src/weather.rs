//! Simulated weather and its crop impact

use chrono::{Days, Local, NaiveDate};
use crop_math::stats::round_to;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

const DESCRIPTIONS: [&str; 5] = ["Clear", "Cloudy", "Partly Cloudy", "Rainy", "Sunny"];

/// Conditions at one location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
}

impl WeatherReading {
    /// A reading with only the fields the alert rules look at
    pub fn new(temperature: f64, humidity: f64, rainfall: f64) -> Self {
        Self {
            temperature,
            humidity,
            rainfall,
            wind_speed: 0.0,
            pressure: 0.0,
            description: String::new(),
            location: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherRisk {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpact {
    pub crop: String,
    pub overall_impact: Impact,
    pub recommendations: Vec<String>,
    pub risk_level: WeatherRisk,
}

/// Random weather generator
#[derive(Debug)]
pub struct WeatherService {
    rng: Mutex<StdRng>,
}

impl WeatherService {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    pub fn current(&self, location: &str) -> WeatherReading {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        WeatherReading {
            temperature: round_to(rng.gen_range(15.0..=35.0), 1),
            humidity: round_to(rng.gen_range(40.0..=90.0), 1),
            rainfall: round_to(rng.gen_range(0.0..=50.0), 1),
            wind_speed: round_to(rng.gen_range(5.0..=25.0), 1),
            pressure: round_to(rng.gen_range(1000.0..=1020.0), 1),
            description: describe(&mut *rng),
            location: location.to_string(),
        }
    }

    /// `days` daily outlooks starting today
    pub fn forecast(&self, days: usize) -> Vec<DailyWeather> {
        let today = Local::now().date_naive();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..days as u64)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .map(|date| DailyWeather {
                date,
                temperature: round_to(rng.gen_range(15.0..=35.0), 1),
                humidity: round_to(rng.gen_range(40.0..=90.0), 1),
                rainfall: round_to(rng.gen_range(0.0..=30.0), 1),
                description: describe(&mut *rng),
            })
            .collect()
    }
}

fn describe<R: Rng>(rng: &mut R) -> String {
    DESCRIPTIONS
        .choose(rng)
        .copied()
        .unwrap_or("Clear")
        .to_string()
}

/// Crop-specific reading of the weather; unknown crops are neutral
pub fn impact(reading: &WeatherReading, crop_type: &str) -> WeatherImpact {
    let temp = reading.temperature;
    let humidity = reading.humidity;
    let rainfall = reading.rainfall;

    let mut overall_impact = Impact::Neutral;
    let mut risk_level = WeatherRisk::Low;
    let mut recommendations = Vec::new();

    match crop_type.to_lowercase().as_str() {
        "rice" => {
            if rainfall > 200.0 && temp > 25.0 {
                overall_impact = Impact::Positive;
                recommendations.push("Excellent conditions for rice cultivation".to_string());
            } else if rainfall < 100.0 {
                overall_impact = Impact::Negative;
                risk_level = WeatherRisk::High;
                recommendations.push("Consider irrigation for rice fields".to_string());
            }
        }
        "wheat" => {
            if (15.0..=25.0).contains(&temp) && humidity < 70.0 {
                overall_impact = Impact::Positive;
                recommendations.push("Ideal conditions for wheat growth".to_string());
            } else if temp > 30.0 {
                overall_impact = Impact::Negative;
                risk_level = WeatherRisk::Medium;
                recommendations.push("High temperature may stress wheat plants".to_string());
            }
        }
        "corn" => {
            if (20.0..=30.0).contains(&temp) && humidity > 60.0 {
                overall_impact = Impact::Positive;
                recommendations.push("Good conditions for corn development".to_string());
            } else if temp < 15.0 {
                overall_impact = Impact::Negative;
                risk_level = WeatherRisk::Medium;
                recommendations.push("Low temperature may slow corn growth".to_string());
            }
        }
        _ => {}
    }

    WeatherImpact {
        crop: crop_type.to_string(),
        overall_impact,
        recommendations,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_current_within_ranges() {
        let service = WeatherService::new(Some(11));
        for _ in 0..50 {
            let w = service.current("Delhi");
            assert!((15.0..=35.0).contains(&w.temperature));
            assert!((40.0..=90.0).contains(&w.humidity));
            assert!((0.0..=50.0).contains(&w.rainfall));
            assert!((5.0..=25.0).contains(&w.wind_speed));
            assert!((1000.0..=1020.0).contains(&w.pressure));
            assert!(DESCRIPTIONS.contains(&w.description.as_str()));
            assert_eq!(w.location, "Delhi");
        }
    }

    #[test]
    fn test_seeded_forecast_is_reproducible() {
        let a = WeatherService::new(Some(5)).forecast(7);
        let b = WeatherService::new(Some(5)).forecast(7);
        assert_eq!(a.len(), 7);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[rstest]
    #[case("rice", 26.0, 60.0, 250.0, Impact::Positive, WeatherRisk::Low)]
    #[case("Rice", 26.0, 60.0, 20.0, Impact::Negative, WeatherRisk::High)]
    #[case("wheat", 20.0, 50.0, 10.0, Impact::Positive, WeatherRisk::Low)]
    #[case("wheat", 32.0, 50.0, 10.0, Impact::Negative, WeatherRisk::Medium)]
    #[case("corn", 25.0, 70.0, 10.0, Impact::Positive, WeatherRisk::Low)]
    #[case("corn", 10.0, 70.0, 10.0, Impact::Negative, WeatherRisk::Medium)]
    #[case("barley", 10.0, 70.0, 10.0, Impact::Neutral, WeatherRisk::Low)]
    fn test_impact(
        #[case] crop: &str,
        #[case] temp: f64,
        #[case] humidity: f64,
        #[case] rain: f64,
        #[case] expected: Impact,
        #[case] risk: WeatherRisk,
    ) {
        let result = impact(&WeatherReading::new(temp, humidity, rain), crop);
        assert_eq!(result.overall_impact, expected);
        assert_eq!(result.risk_level, risk);
        assert_eq!(result.recommendations.is_empty(), expected == Impact::Neutral);
    }
}
