use market_insight::data::{DataLoader, DataStore, MarketQuery};
use market_insight::{MarketError, PRICE_FLOOR};
use std::io::Write;
use tempfile::NamedTempFile;

fn market_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,crop_type,price,demand").unwrap();
    writeln!(file, "2023-01-03,wheat,203.0,98.0").unwrap();
    writeln!(file, "2023-01-01,wheat,201.0,100.0").unwrap();
    writeln!(file, "2023-01-01,corn,0.0,80.0").unwrap();
    writeln!(file, "2023-01-02,wheat,202.0,99.0").unwrap();
    file
}

#[test]
fn test_read_market_csv_clamps_prices() {
    let file = market_file();
    let records = DataLoader::read_market_csv(file.path()).unwrap();

    assert_eq!(records.len(), 4);
    assert_eq!(records[2].price, PRICE_FLOOR);
}

#[test]
fn test_store_orders_each_series() {
    let file = market_file();
    let store = DataStore::new(vec![], DataLoader::load_market_table(file.path()));

    let wheat: Vec<f64> = store
        .series("wheat")
        .unwrap()
        .iter()
        .map(|r| r.price)
        .collect();
    assert_eq!(wheat, vec![201.0, 202.0, 203.0]);

    let query = MarketQuery {
        crop_type: Some("all".to_string()),
        start_date: Some("2023-01-02".parse().unwrap()),
        end_date: None,
    };
    assert_eq!(store.query_market(&query).len(), 2);
}

#[test]
fn test_crop_csv_reads_yield_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "year,crop_type,region,production,yield").unwrap();
    writeln!(file, "2020,rice,east,1100.5,3.9").unwrap();

    let records = DataLoader::read_crop_csv(file.path()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].crop_yield, 3.9);
    assert_eq!(records[0].region, "east");
}

#[test]
fn test_missing_file_yields_empty_table() {
    assert!(matches!(
        DataLoader::read_market_csv("nonexistent_market.csv"),
        Err(MarketError::Csv(_))
    ));
    assert!(DataLoader::load_market_table("nonexistent_market.csv").is_empty());
    assert!(DataLoader::load_crop_table("nonexistent_crop.csv").is_empty());
}

#[test]
fn test_malformed_row_yields_empty_table() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,crop_type,price,demand").unwrap();
    writeln!(file, "not-a-date,wheat,abc,1").unwrap();

    assert!(DataLoader::read_market_csv(file.path()).is_err());
    assert!(DataLoader::load_market_table(file.path()).is_empty());
}
