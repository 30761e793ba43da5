//! Synthetic crop and market datasets

use crate::data::{CropRecord, DataLoader, MarketRecord};
use crate::error::{MarketError, Result};
use chrono::{Datelike, NaiveDate};
use crop_math::MathError;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::fs;
use std::path::Path;

pub const CROPS: [&str; 5] = ["wheat", "corn", "rice", "soybean", "barley"];
pub const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

const FIRST_YEAR: i32 = 2018;
const LAST_YEAR: i32 = 2023;

/// Base price around which each crop's market price oscillates
pub fn base_price(crop: &str) -> f64 {
    match crop {
        "wheat" => 200.0,
        "corn" => 180.0,
        "rice" => 300.0,
        "soybean" => 350.0,
        "barley" => 150.0,
        _ => 200.0,
    }
}

fn normal(mean: f64, std: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std).map_err(|e| MarketError::Math(MathError::InvalidInput(e.to_string())))
}

/// Seedable generator for both tables
#[derive(Debug)]
pub struct DataGenerator {
    rng: StdRng,
}

impl DataGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// One record per year, crop and region
    pub fn crop_records(&mut self) -> Result<Vec<CropRecord>> {
        let production = normal(1000.0, 200.0)?;
        let crop_yield = normal(3.5, 0.7)?;

        let mut records = Vec::new();
        for year in FIRST_YEAR..=LAST_YEAR {
            for crop in CROPS {
                for region in REGIONS {
                    records.push(CropRecord {
                        year,
                        crop_type: crop.to_string(),
                        region: region.to_string(),
                        production: production.sample(&mut self.rng).max(500.0),
                        crop_yield: crop_yield.sample(&mut self.rng).max(0.0),
                    });
                }
            }
        }
        Ok(records)
    }

    /// Daily prices with a yearly seasonal swing between two dates
    pub fn market_records(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<MarketRecord>> {
        let noise = normal(0.0, 10.0)?;
        let demand = normal(100.0, 20.0)?;

        let mut records = Vec::new();
        for date in start.iter_days().take_while(|d| *d <= end) {
            let seasonal = 20.0 * (2.0 * PI * date.ordinal() as f64 / 365.0).sin();
            for crop in CROPS {
                let base = base_price(crop);
                let price = base + seasonal + noise.sample(&mut self.rng);
                records.push(MarketRecord {
                    date,
                    crop_type: crop.to_string(),
                    price: price.max(base * 0.5),
                    demand: demand.sample(&mut self.rng),
                });
            }
        }
        Ok(records)
    }

    /// Write both CSV files, creating parent directories
    pub fn write_datasets(
        &mut self,
        crop_path: &Path,
        market_path: &Path,
    ) -> Result<(usize, usize)> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1)
            .ok_or_else(|| MarketError::InvalidParameter("bad start date".to_string()))?;
        let end = NaiveDate::from_ymd_opt(2023, 12, 31)
            .ok_or_else(|| MarketError::InvalidParameter("bad end date".to_string()))?;

        for path in [crop_path, market_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
        }

        let crops = self.crop_records()?;
        DataLoader::write_crop_csv(crop_path, &crops)?;
        info!("Generated sample crop data with {} records", crops.len());

        let market = self.market_records(start, end)?;
        DataLoader::write_market_csv(market_path, &market)?;
        info!("Generated sample market data with {} records", market.len());

        Ok((crops.len(), market.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_records_cover_grid() {
        let records = DataGenerator::new(Some(1)).crop_records().unwrap();
        assert_eq!(records.len(), 6 * 5 * 4);
        assert!(records.iter().all(|r| r.production >= 500.0));
    }

    #[test]
    fn test_market_prices_are_floored() {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        let records = DataGenerator::new(Some(2)).market_records(start, end).unwrap();
        assert_eq!(records.len(), 31 * CROPS.len());
        assert!(records
            .iter()
            .all(|r| r.price >= base_price(&r.crop_type) * 0.5));
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = DataGenerator::new(Some(9)).crop_records().unwrap();
        let b = DataGenerator::new(Some(9)).crop_records().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_write_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let crop_path = dir.path().join("data/crop_data.csv");
        let market_path = dir.path().join("data/market_data.csv");

        let (crops, market) = DataGenerator::new(Some(3))
            .write_datasets(&crop_path, &market_path)
            .unwrap();
        assert_eq!(crops, 120);
        assert_eq!(market, 1461 * 5);
        assert_eq!(DataLoader::read_market_csv(&market_path).unwrap().len(), market);
    }
}
