//! Market insight aggregation: summary statistics, seasonality and recommendations

use crate::data::{prices, DataStore, MarketRecord};
use crate::error::{MarketError, Result};
use chrono::Datelike;
use crop_math::stats::{max_value, mean, min_value, round_to, sample_std_dev};
use crop_math::{trend, volatility, TrendDirection, TrendReport, VolatilityReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records in the short-term trend window used by recommendations
pub const RECENT_TREND_WINDOW: usize = 7;

/// Records used by predictive insights
pub const PREDICTION_WINDOW: usize = 30;

/// Summary statistics over a recent window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub current_price: f64,
    pub price_change_pct: f64,
    pub high: f64,
    pub low: f64,
    pub avg: f64,
    /// Number of records in the window
    pub volume: usize,
}

/// Monthly price pattern over the full history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub peak_month: u32,
    pub low_month: u32,
    pub seasonal_variation: f64,
    pub monthly_averages: BTreeMap<u32, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Buy,
    Sell,
    Hold,
    Caution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    pub confidence: Confidence,
}

impl Recommendation {
    fn new(kind: RecommendationKind, message: &str, confidence: Confidence) -> Self {
        Self {
            kind,
            message: message.to_string(),
            confidence,
        }
    }
}

/// Full insight report for one crop (or the whole market)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub crop_type: String,
    pub summary: Option<MarketSummary>,
    pub trends: TrendReport,
    pub volatility: VolatilityReport,
    pub seasonality: Option<Seasonality>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Trend-extrapolated price projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveInsight {
    pub crop_type: String,
    pub predicted_price: f64,
    pub confidence: f64,
    pub price_range: PriceRange,
    pub recommendation: String,
}

/// Summary over a window; `None` when the window is empty
///
/// The change is measured against the second-to-last point and is 0 when the
/// window holds a single record.
pub fn summary(window: &[MarketRecord]) -> Option<MarketSummary> {
    let values = prices(window);
    let current = *values.last()?;
    let previous = if values.len() > 1 {
        values[values.len() - 2]
    } else {
        current
    };
    let change = if previous != 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    Some(MarketSummary {
        current_price: round_to(current, 2),
        price_change_pct: round_to(change, 2),
        high: round_to(max_value(&values)?, 2),
        low: round_to(min_value(&values)?, 2),
        avg: round_to(mean(&values)?, 2),
        volume: values.len(),
    })
}

/// Average price per calendar month across every record given
pub fn seasonality(records: &[MarketRecord]) -> Option<Seasonality> {
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = buckets.entry(record.date.month()).or_insert((0.0, 0));
        entry.0 += record.price;
        entry.1 += 1;
    }

    let monthly_averages: BTreeMap<u32, f64> = buckets
        .into_iter()
        .map(|(month, (sum, count))| (month, sum / count as f64))
        .collect();

    // earliest month wins ties
    let mut peak: Option<(u32, f64)> = None;
    let mut low: Option<(u32, f64)> = None;
    for (&month, &avg) in &monthly_averages {
        if peak.map_or(true, |(_, best)| avg > best) {
            peak = Some((month, avg));
        }
        if low.map_or(true, |(_, best)| avg < best) {
            low = Some((month, avg));
        }
    }

    let averages: Vec<f64> = monthly_averages.values().copied().collect();
    Some(Seasonality {
        peak_month: peak?.0,
        low_month: low?.0,
        seasonal_variation: round_to(sample_std_dev(&averages).unwrap_or(0.0), 2),
        monthly_averages,
    })
}

/// Threshold policy over the current price, the window average and the recent trend
///
/// Trends count once their strength exceeds `trend_threshold`.
pub fn recommend(
    current: f64,
    avg: f64,
    recent_trend: &TrendReport,
    trend_threshold: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if current < avg * 0.9 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Buy,
            "Price is below average - good buying opportunity",
            Confidence::High,
        ));
    }
    if current > avg * 1.1 {
        recommendations.push(Recommendation::new(
            RecommendationKind::Sell,
            "Price is above average - consider selling",
            Confidence::Medium,
        ));
    }
    if recent_trend.is_strong(TrendDirection::Up, trend_threshold) {
        recommendations.push(Recommendation::new(
            RecommendationKind::Hold,
            "Strong upward trend - hold position",
            Confidence::High,
        ));
    }
    if recent_trend.is_strong(TrendDirection::Down, trend_threshold) {
        recommendations.push(Recommendation::new(
            RecommendationKind::Caution,
            "Downward trend detected - monitor closely",
            Confidence::Medium,
        ));
    }

    recommendations
}

/// Recommendations for a window
///
/// Compares the last price against the window mean and reads the trend of the last 7 records.
pub fn recommendations(window: &[MarketRecord], trend_threshold: f64) -> Vec<Recommendation> {
    let values = prices(window);
    let (Some(&current), Some(avg)) = (values.last(), mean(&values)) else {
        return Vec::new();
    };
    let recent = &values[values.len().saturating_sub(RECENT_TREND_WINDOW)..];
    recommend(current, avg, &trend(recent), trend_threshold)
}

fn tail<T>(records: &[T], count: usize) -> &[T] {
    &records[records.len().saturating_sub(count)..]
}

/// Insight report over the last `days` records of a crop, or of the whole market for `"all"`
pub fn market_insights(
    store: &DataStore,
    crop_type: Option<&str>,
    days: usize,
    trend_threshold: f64,
) -> Result<InsightReport> {
    if store.market_records().is_empty() {
        return Err(MarketError::MissingData(
            "No market data available".to_string(),
        ));
    }

    let history = store.market_selection(crop_type);
    let label = crate::data::selector(crop_type).unwrap_or("all");
    if history.is_empty() {
        return Err(MarketError::MissingData(format!(
            "No data available for {}",
            label
        )));
    }

    let window = tail(history, days);
    let window_prices = prices(window);

    Ok(InsightReport {
        crop_type: label.to_string(),
        summary: summary(window),
        trends: trend(&window_prices),
        volatility: volatility(&window_prices),
        seasonality: seasonality(history),
        recommendations: recommendations(window, trend_threshold),
    })
}

/// Project the 30-record trend `days_ahead` days forward
pub fn predictive_insights(
    store: &DataStore,
    crop_type: &str,
    days_ahead: usize,
) -> Result<PredictiveInsight> {
    if store.market_records().is_empty() {
        return Err(MarketError::MissingData(
            "No market data available".to_string(),
        ));
    }
    let series = store
        .series(crop_type)
        .ok_or_else(|| MarketError::MissingData(format!("No data available for {}", crop_type)))?;

    let recent = prices(tail(series, PREDICTION_WINDOW));
    let report = trend(&recent);
    let (Some(slope), Some(strength)) = (report.slope, report.strength) else {
        return Err(MarketError::InsufficientSeries(format!(
            "{} has fewer than 2 observations",
            crop_type
        )));
    };

    let current = recent[recent.len() - 1];
    let predicted = current + slope * days_ahead as f64;
    let confidence = (strength * 100.0).clamp(30.0, 95.0);

    Ok(PredictiveInsight {
        crop_type: crop_type.to_string(),
        predicted_price: round_to(predicted, 2),
        confidence: round_to(confidence, 1),
        price_range: PriceRange {
            min: round_to(predicted * 0.9, 2),
            max: round_to(predicted * 1.1, 2),
        },
        recommendation: prediction_recommendation(report.direction, confidence).to_string(),
    })
}

fn prediction_recommendation(direction: TrendDirection, confidence: f64) -> &'static str {
    if confidence < 50.0 {
        return "Low confidence prediction - use with caution";
    }
    match direction {
        TrendDirection::Up => "Price expected to rise - consider buying",
        TrendDirection::Down => "Price expected to fall - consider selling",
        _ => "Price expected to remain stable",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(month: u32, day: u32, price: f64) -> MarketRecord {
        MarketRecord {
            date: NaiveDate::from_ymd_opt(2023, month, day).unwrap(),
            crop_type: "wheat".to_string(),
            price,
            demand: 100.0,
        }
    }

    fn flat() -> TrendReport {
        trend(&[1.0, 1.0])
    }

    #[test]
    fn test_recommend_price_thresholds() {
        let buy = recommend(85.0, 100.0, &flat(), 0.5);
        assert!(buy.iter().any(|r| r.kind == RecommendationKind::Buy));

        let sell = recommend(115.0, 100.0, &flat(), 0.5);
        assert!(sell.iter().any(|r| r.kind == RecommendationKind::Sell));

        let neutral = recommend(100.0, 100.0, &flat(), 0.5);
        assert!(neutral.is_empty());
    }

    #[test]
    fn test_recommend_trend_rules_stack() {
        let rising = trend(&[100.0, 101.0, 102.0, 103.0]);
        let recs = recommend(85.0, 100.0, &rising, 0.5);
        let kinds: Vec<_> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecommendationKind::Buy, RecommendationKind::Hold]);

        let falling = trend(&[103.0, 102.0, 101.0, 100.0]);
        let recs = recommend(100.0, 100.0, &falling, 0.5);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, RecommendationKind::Caution);
        assert_eq!(recs[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_trend_threshold_is_configurable() {
        let rising = trend(&[100.0, 101.0, 102.0, 103.0]);
        let kinds: Vec<_> = recommend(100.0, 100.0, &rising, 0.5)
            .iter()
            .map(|r| r.kind)
            .collect();
        assert_eq!(kinds, vec![RecommendationKind::Hold]);

        assert!(recommend(100.0, 100.0, &rising, 0.95).is_empty());
    }

    #[test]
    fn test_recommendations_use_last_seven_records() {
        // Rises overall, but the last seven records fall
        let prices = [50.0, 70.0, 90.0, 110.0, 108.0, 106.0, 104.0, 102.0, 100.0, 98.0];
        let window: Vec<_> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| record(1, i as u32 + 1, p))
            .collect();
        assert_eq!(trend(&prices).direction, TrendDirection::Up);

        let kinds: Vec<_> = recommendations(&window, 0.4).iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RecommendationKind::Caution]);

        assert!(recommendations(&window, 0.6).is_empty());
    }

    #[test]
    fn test_insights_seasonality_spans_full_history() {
        let records = vec![
            record(1, 1, 100.0),
            record(2, 1, 120.0),
            record(3, 1, 90.0),
            record(4, 1, 110.0),
            record(4, 2, 112.0),
        ];
        let store = DataStore::new(vec![], records);

        let report = market_insights(&store, Some("wheat"), 2, 0.5).unwrap();
        assert_eq!(report.summary.unwrap().volume, 2);

        let seasonality = report.seasonality.unwrap();
        assert_eq!(
            seasonality.monthly_averages.keys().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(seasonality.peak_month, 2);
        assert_eq!(seasonality.low_month, 3);
    }

    #[test]
    fn test_summary() {
        let window = vec![record(1, 1, 100.0), record(1, 2, 90.0), record(1, 3, 99.0)];
        let s = summary(&window).unwrap();
        assert_eq!(s.current_price, 99.0);
        assert_eq!(s.price_change_pct, 10.0);
        assert_eq!(s.high, 100.0);
        assert_eq!(s.low, 90.0);
        assert_eq!(s.avg, 96.33);
        assert_eq!(s.volume, 3);

        let single = summary(&window[..1]).unwrap();
        assert_eq!(single.price_change_pct, 0.0);
        assert!(summary(&[]).is_none());
    }

    #[test]
    fn test_seasonality() {
        let records = vec![
            record(1, 1, 100.0),
            record(1, 2, 110.0),
            record(2, 1, 90.0),
            record(3, 1, 130.0),
        ];
        let s = seasonality(&records).unwrap();
        assert_eq!(s.peak_month, 3);
        assert_eq!(s.low_month, 2);
        assert_eq!(s.monthly_averages[&1], 105.0);
        assert!(s.seasonal_variation > 0.0);

        let one_month = seasonality(&records[..2]).unwrap();
        assert_eq!(one_month.seasonal_variation, 0.0);
        assert_eq!(one_month.peak_month, one_month.low_month);
        assert!(seasonality(&[]).is_none());
    }

    #[test]
    fn test_prediction_recommendation() {
        assert_eq!(
            prediction_recommendation(TrendDirection::Up, 40.0),
            "Low confidence prediction - use with caution"
        );
        assert_eq!(
            prediction_recommendation(TrendDirection::Down, 80.0),
            "Price expected to fall - consider selling"
        );
    }
}
