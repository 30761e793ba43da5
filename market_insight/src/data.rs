//! Crop and market tables, loaded once and indexed per crop

use crate::config::AppConfig;
use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Lowest price kept after loading; ratios over prices never divide by zero
pub const PRICE_FLOOR: f64 = 0.01;

/// Yearly production of one crop in one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropRecord {
    pub year: i32,
    pub crop_type: String,
    pub region: String,
    pub production: f64,
    #[serde(rename = "yield")]
    pub crop_yield: f64,
}

/// Daily market observation of one crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRecord {
    pub date: NaiveDate,
    pub crop_type: String,
    pub price: f64,
    pub demand: f64,
}

/// Prices of a record slice, in order
pub fn prices(records: &[MarketRecord]) -> Vec<f64> {
    records.iter().map(|r| r.price).collect()
}

/// Parse a `YYYY-MM-DD` date parameter
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        MarketError::InvalidParameter(format!("invalid date '{}': {}", value, e))
    })
}

/// Treat `None`, empty and `"all"` as "no filter"
pub fn selector(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// CSV reader and writer for the two tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Read crop records, failing on a missing file or malformed row
    pub fn read_crop_csv<P: AsRef<Path>>(path: P) -> Result<Vec<CropRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    /// Read market records, failing on a missing file or malformed row
    ///
    /// Prices are clamped to [`PRICE_FLOOR`].
    pub fn read_market_csv<P: AsRef<Path>>(path: P) -> Result<Vec<MarketRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let mut record: MarketRecord = row?;
            if !(record.price >= PRICE_FLOOR) {
                record.price = PRICE_FLOOR;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Load the crop table; a missing or corrupt file yields an empty table
    pub fn load_crop_table<P: AsRef<Path>>(path: P) -> Vec<CropRecord> {
        let path = path.as_ref();
        match Self::read_crop_csv(path) {
            Ok(records) => {
                info!("Loaded crop data with {} records", records.len());
                records
            }
            Err(e) => {
                warn!("Error loading crop data from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Load the market table; a missing or corrupt file yields an empty table
    pub fn load_market_table<P: AsRef<Path>>(path: P) -> Vec<MarketRecord> {
        let path = path.as_ref();
        match Self::read_market_csv(path) {
            Ok(records) => {
                info!("Loaded market data with {} records", records.len());
                records
            }
            Err(e) => {
                warn!("Error loading market data from {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn write_crop_csv<P: AsRef<Path>>(path: P, records: &[CropRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_market_csv<P: AsRef<Path>>(path: P, records: &[MarketRecord]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Market data filter
#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    pub crop_type: Option<String>,
    /// Inclusive lower bound
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound
    pub end_date: Option<NaiveDate>,
}

/// Crop data filter
#[derive(Debug, Clone, Default)]
pub struct CropQuery {
    pub crop_type: Option<String>,
    pub region: Option<String>,
}

/// Read-only snapshot of both tables
///
/// The market table is kept in date order and indexed by crop at construction.
#[derive(Debug, Clone, Default)]
pub struct DataStore {
    crops: Vec<CropRecord>,
    market: Vec<MarketRecord>,
    series: HashMap<String, Vec<MarketRecord>>,
    market_crops: Vec<String>,
}

impl DataStore {
    /// Build a store; market records are stably sorted by date
    pub fn new(crops: Vec<CropRecord>, mut market: Vec<MarketRecord>) -> Self {
        market.sort_by_key(|r| r.date);

        let mut series: HashMap<String, Vec<MarketRecord>> = HashMap::new();
        let mut market_crops = Vec::new();
        for record in &market {
            if !series.contains_key(&record.crop_type) {
                market_crops.push(record.crop_type.clone());
            }
            series
                .entry(record.crop_type.clone())
                .or_default()
                .push(record.clone());
        }

        Self {
            crops,
            market,
            series,
            market_crops,
        }
    }

    /// Load both tables from the configured paths
    pub fn load(config: &AppConfig) -> Self {
        let crops = DataLoader::load_crop_table(&config.crop_data_path);
        let market = DataLoader::load_market_table(&config.market_data_path);
        let store = Self::new(crops, market);
        info!(
            "Data store ready: {} crop records, {} market records across {} crops",
            store.crops.len(),
            store.market.len(),
            store.market_crops.len()
        );
        store
    }

    pub fn crop_records(&self) -> &[CropRecord] {
        &self.crops
    }

    /// All market records in date order
    pub fn market_records(&self) -> &[MarketRecord] {
        &self.market
    }

    /// Date-ordered series of one crop
    pub fn series(&self, crop_type: &str) -> Option<&[MarketRecord]> {
        self.series.get(crop_type).map(Vec::as_slice)
    }

    /// Every crop series, in order of first appearance
    pub fn series_iter(&self) -> impl Iterator<Item = (&str, &[MarketRecord])> {
        self.market_crops.iter().filter_map(|crop| {
            self.series
                .get(crop)
                .map(|records| (crop.as_str(), records.as_slice()))
        })
    }

    /// One crop's series, or the whole table for `None`/`"all"`
    pub fn market_selection(&self, crop_type: Option<&str>) -> &[MarketRecord] {
        match selector(crop_type) {
            Some(crop) => self.series(crop).unwrap_or(&[]),
            None => &self.market,
        }
    }

    pub fn query_market(&self, query: &MarketQuery) -> Vec<MarketRecord> {
        self.market_selection(query.crop_type.as_deref())
            .iter()
            .filter(|r| query.start_date.map_or(true, |start| r.date >= start))
            .filter(|r| query.end_date.map_or(true, |end| r.date <= end))
            .cloned()
            .collect()
    }

    pub fn query_crops(&self, query: &CropQuery) -> Vec<CropRecord> {
        let crop = selector(query.crop_type.as_deref());
        let region = selector(query.region.as_deref());
        self.crops
            .iter()
            .filter(|r| crop.map_or(true, |c| r.crop_type == c))
            .filter(|r| region.map_or(true, |g| r.region == g))
            .cloned()
            .collect()
    }

    /// Crops present in the market table
    pub fn market_crops(&self) -> &[String] {
        &self.market_crops
    }

    /// Crops present in the crop table, in order of first appearance
    pub fn available_crops(&self) -> Vec<String> {
        unique(self.crops.iter().map(|r| r.crop_type.as_str()))
    }

    /// Regions present in the crop table, in order of first appearance
    pub fn available_regions(&self) -> Vec<String> {
        unique(self.crops.iter().map(|r| r.region.as_str()))
    }

    /// True when both tables hold records
    pub fn has_data(&self) -> bool {
        !self.crops.is_empty() && !self.market.is_empty()
    }
}

fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|s| s == value) {
            seen.push(value.to_string());
        }
    }
    seen
}
