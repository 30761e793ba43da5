use chrono::NaiveDate;
use market_insight::data::{DataStore, MarketRecord};
use market_insight::{AlertEvaluator, AlertKind, AlertThresholds, Severity, WeatherReading};

fn two_day_store(crop: &str, previous: f64, current: f64) -> DataStore {
    let records = [(1, previous), (2, current)]
        .into_iter()
        .map(|(day, price)| MarketRecord {
            date: NaiveDate::from_ymd_opt(2023, 6, day).unwrap(),
            crop_type: crop.to_string(),
            price,
            demand: 100.0,
        })
        .collect();
    DataStore::new(vec![], records)
}

#[test]
fn test_heat_wave_raises_single_alert() {
    let weather = WeatherReading::new(40.0, 50.0, 0.0);
    let alerts = AlertEvaluator::default().check_weather_alerts(&weather, "wheat");

    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind, AlertKind::Weather);
    assert_eq!(alerts[0].severity, Severity::High);
    assert_eq!(alerts[0].crop, "wheat");
    assert!(alerts[0].message.contains("High temperature"));
}

#[test]
fn test_price_alert_threshold_is_inclusive() {
    let evaluator = AlertEvaluator::default();

    let at_threshold = evaluator.check_price_alerts(&two_day_store("wheat", 100.0, 110.0));
    assert_eq!(at_threshold.len(), 1);
    assert_eq!(at_threshold[0].price_change, Some(10.0));
    assert_eq!(at_threshold[0].severity, Severity::Medium);

    let below = evaluator.check_price_alerts(&two_day_store("wheat", 100.0, 109.99));
    assert!(below.is_empty());
}

#[test]
fn test_configured_thresholds_apply() {
    let evaluator = AlertEvaluator::new(AlertThresholds {
        price_change_pct: 5.0,
        ..AlertThresholds::default()
    });
    let alerts = evaluator.check_price_alerts(&two_day_store("rice", 100.0, 94.0));

    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].message.contains("decreased by 6.0%"));
}

#[test]
fn test_alert_serializes_type_field() {
    let alerts = AlertEvaluator::default().check_price_alerts(&two_day_store("corn", 100.0, 130.0));
    let json = serde_json::to_value(&alerts[0]).unwrap();

    assert_eq!(json["type"], "price");
    assert_eq!(json["severity"], "high");
    assert!(json.get("volatility").is_none());
}
