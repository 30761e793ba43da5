//! Production and price analysis across the crop and market tables

use crate::data::{prices, selector, CropRecord, CropQuery, DataStore, MarketRecord};
use crate::error::{MarketError, Result};
use crop_math::growth_label;
use crop_math::stats::round_to;
use crop_math::TrendDirection;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;

/// Records behind the short-term price slope of the overview
pub const OVERVIEW_TREND_WINDOW: usize = 7;

/// Records returned with the overview
pub const OVERVIEW_RECORDS: usize = 30;

/// Production and price totals for a crop/region selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub crop_type: String,
    pub region: String,
    pub total_production: f64,
    pub average_price: f64,
    /// Percent change from first to last price, e.g. `"4.20%"`
    pub price_trend: String,
    /// Percent change from first to last production year
    pub production_trend: String,
    pub records_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPerformance {
    pub crop_type: String,
    pub avg_production: f64,
    pub avg_yield: f64,
    pub production_trend: String,
    pub yield_trend: String,
    pub best_region: Option<String>,
    /// 0 to 100
    pub performance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestPrice {
    pub price: f64,
    pub change: f64,
    pub trend: TrendDirection,
}

/// Latest prices, short-term slopes and the most recent records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    pub latest_prices: BTreeMap<String, LatestPrice>,
    pub price_trends: BTreeMap<String, f64>,
    pub data: Vec<MarketRecord>,
}

/// Percent change between the first and last value
fn percent_trend(values: &[f64]) -> String {
    match values {
        [] => "insufficient data".to_string(),
        [_] => "stable".to_string(),
        [first, .., last] => format!("{:.2}%", (last - first) / first * 100.0),
    }
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().mean()
    }
}

/// Totals and first-to-last trends for a crop and region
///
/// Market records carry no region, so the region only narrows production.
pub fn analyze(store: &DataStore, crop_type: Option<&str>, region: Option<&str>) -> MarketAnalysis {
    let crop = selector(crop_type);

    let mut crops = store.query_crops(&CropQuery {
        crop_type: crop.map(str::to_string),
        region: region.map(str::to_string),
    });
    crops.sort_by_key(|r| r.year);
    let production: Vec<f64> = crops.iter().map(|r| r.production).collect();

    let market = store.market_selection(crop);
    let market_prices = prices(market);

    MarketAnalysis {
        crop_type: crop.unwrap_or("all").to_string(),
        region: selector(region).unwrap_or("all").to_string(),
        total_production: production.iter().sum(),
        average_price: average(&market_prices),
        price_trend: percent_trend(&market_prices),
        production_trend: percent_trend(&production),
        records_analyzed: market.len(),
    }
}

/// Region with the highest mean yield; the first seen wins ties
fn best_region(records: &[&CropRecord]) -> Option<String> {
    let mut regions: Vec<(&str, Vec<f64>)> = Vec::new();
    for record in records {
        match regions.iter_mut().find(|(region, _)| *region == record.region) {
            Some((_, yields)) => yields.push(record.crop_yield),
            None => regions.push((record.region.as_str(), vec![record.crop_yield])),
        }
    }

    let mut best: Option<(&str, f64)> = None;
    for (region, yields) in &regions {
        let avg = average(yields);
        if best.map_or(true, |(_, top)| avg > top) {
            best = Some((*region, avg));
        }
    }
    best.map(|(region, _)| region.to_string())
}

/// `0.6 * production score + 0.4 * yield score`, each capped at 100
pub fn performance_score(avg_production: f64, avg_yield: f64) -> f64 {
    let production_score = (avg_production / 1000.0 * 100.0).min(100.0);
    let yield_score = (avg_yield / 5.0 * 100.0).min(100.0);
    round_to(production_score * 0.6 + yield_score * 0.4, 1)
}

/// Per-crop production, yield and growth for a region
pub fn crop_performance(store: &DataStore, region: Option<&str>) -> Result<Vec<CropPerformance>> {
    if store.crop_records().is_empty() {
        return Err(MarketError::MissingData(
            "No crop data available".to_string(),
        ));
    }

    let region = selector(region);
    let mut selected: Vec<&CropRecord> = store
        .crop_records()
        .iter()
        .filter(|r| region.map_or(true, |g| r.region == g))
        .collect();
    selected.sort_by_key(|r| r.year);

    let mut report = Vec::new();
    for crop in store.available_crops() {
        let records: Vec<&CropRecord> = selected
            .iter()
            .copied()
            .filter(|r| r.crop_type == crop)
            .collect();
        if records.is_empty() {
            continue;
        }

        let production: Vec<f64> = records.iter().map(|r| r.production).collect();
        let yields: Vec<f64> = records.iter().map(|r| r.crop_yield).collect();
        let avg_production = average(&production);
        let avg_yield = average(&yields);

        report.push(CropPerformance {
            crop_type: crop,
            avg_production: round_to(avg_production, 2),
            avg_yield: round_to(avg_yield, 2),
            production_trend: growth_label(&production).to_string(),
            yield_trend: growth_label(&yields).to_string(),
            best_region: best_region(&records),
            performance_score: performance_score(avg_production, avg_yield),
        });
    }

    Ok(report)
}

/// Latest price per crop, 7-record slope and the last 30 records
pub fn market_overview(store: &DataStore, crop_type: Option<&str>) -> MarketOverview {
    let crop = selector(crop_type);
    let mut latest_prices = BTreeMap::new();
    let mut price_trends = BTreeMap::new();

    for (name, series) in store.series_iter() {
        if crop.map_or(false, |c| c != name) {
            continue;
        }
        let Some(last) = series.last() else {
            continue;
        };

        let change = match series {
            [.., previous, _] => (last.price - previous.price) / previous.price * 100.0,
            _ => 0.0,
        };
        let trend = if change > 0.0 {
            TrendDirection::Up
        } else if change < 0.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Stable
        };
        latest_prices.insert(
            name.to_string(),
            LatestPrice {
                price: round_to(last.price, 2),
                change: round_to(change, 2),
                trend,
            },
        );

        let recent = &series[series.len().saturating_sub(OVERVIEW_TREND_WINDOW)..];
        if let [first, .., last] = recent {
            let slope = (last.price - first.price) / recent.len() as f64;
            price_trends.insert(name.to_string(), round_to(slope, 2));
        }
    }

    let selection = store.market_selection(crop);
    let data = selection[selection.len().saturating_sub(OVERVIEW_RECORDS)..].to_vec();

    MarketOverview {
        latest_prices,
        price_trends,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};
    use pretty_assertions::assert_eq;

    fn crop(year: i32, crop: &str, region: &str, production: f64, crop_yield: f64) -> CropRecord {
        CropRecord {
            year,
            crop_type: crop.to_string(),
            region: region.to_string(),
            production,
            crop_yield,
        }
    }

    fn market(crop: &str, prices: &[f64]) -> Vec<MarketRecord> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| MarketRecord {
                date: start.checked_add_days(Days::new(i as u64)).unwrap(),
                crop_type: crop.to_string(),
                price,
                demand: 100.0,
            })
            .collect()
    }

    fn sample() -> DataStore {
        let mut records = market(
            "wheat",
            &[100.0, 102.0, 104.0, 106.0, 108.0, 110.0, 112.0, 114.0],
        );
        records.extend(market("corn", &[50.0, 50.0]));
        DataStore::new(
            vec![
                crop(2021, "wheat", "north", 1200.0, 4.0),
                crop(2020, "wheat", "north", 1000.0, 3.0),
                crop(2020, "wheat", "south", 800.0, 5.0),
                crop(2020, "corn", "south", 500.0, 2.0),
            ],
            records,
        )
    }

    #[test]
    fn test_analyze() {
        let store = sample();
        let result = analyze(&store, Some("wheat"), Some("north"));
        assert_eq!(result.crop_type, "wheat");
        assert_eq!(result.region, "north");
        assert_relative_eq!(result.total_production, 2200.0);
        assert_relative_eq!(result.average_price, 107.0);
        assert_eq!(result.price_trend, "14.00%");
        assert_eq!(result.production_trend, "20.00%");
        assert_eq!(result.records_analyzed, 8);

        let empty = analyze(&store, Some("rice"), None);
        assert_eq!(empty.price_trend, "insufficient data");
        assert_eq!(empty.average_price, 0.0);
        assert_eq!(empty.region, "all");
    }

    #[test]
    fn test_crop_performance() {
        let report = crop_performance(&sample(), None).unwrap();
        assert_eq!(report.len(), 2);

        let wheat = &report[0];
        assert_eq!(wheat.crop_type, "wheat");
        assert_relative_eq!(wheat.avg_production, 1000.0);
        assert_relative_eq!(wheat.avg_yield, 4.0);
        assert_eq!(wheat.best_region.as_deref(), Some("south"));
        assert_relative_eq!(wheat.performance_score, 92.0);

        assert_eq!(wheat.production_trend, "increasing");
        assert_eq!(wheat.yield_trend, "increasing");

        let south = crop_performance(&sample(), Some("south")).unwrap();
        assert_eq!(south.len(), 2);
        assert_eq!(south[0].production_trend, "insufficient_data");
        assert_eq!(south[0].best_region.as_deref(), Some("south"));
    }

    #[test]
    fn test_performance_score_is_capped() {
        assert_relative_eq!(performance_score(5000.0, 10.0), 100.0);
        assert_relative_eq!(performance_score(500.0, 2.5), 50.0);
    }

    #[test]
    fn test_market_overview() {
        let overview = market_overview(&sample(), None);
        let wheat = &overview.latest_prices["wheat"];
        assert_relative_eq!(wheat.price, 114.0);
        assert_eq!(wheat.trend, TrendDirection::Up);
        assert_eq!(overview.latest_prices["corn"].trend, TrendDirection::Stable);
        assert_relative_eq!(overview.price_trends["wheat"], 12.0 / 7.0_f64, epsilon = 0.01);
        assert_eq!(overview.data.len(), 10);

        let corn = market_overview(&sample(), Some("corn"));
        assert_eq!(corn.latest_prices.len(), 1);
        assert_eq!(corn.data.len(), 2);
    }

    #[test]
    fn test_empty_crop_table() {
        let store = DataStore::new(vec![], market("wheat", &[1.0]));
        assert!(matches!(
            crop_performance(&store, None),
            Err(MarketError::MissingData(_))
        ));
    }
}
