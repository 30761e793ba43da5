//! Dataset export as CSV text or JSON records

use crate::data::DataStore;
use crate::error::{MarketError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Market,
    Crop,
}

impl FromStr for DatasetKind {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "market" => Ok(DatasetKind::Market),
            "crop" => Ok(DatasetKind::Crop),
            other => Err(MarketError::InvalidParameter(format!(
                "Invalid data type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(MarketError::InvalidParameter(format!(
                "Invalid format type: {}",
                other
            ))),
        }
    }
}

/// Exported table: CSV text or an array of JSON records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Export {
    #[serde(rename = "type")]
    pub format: ExportFormat,
    pub data: serde_json::Value,
}

fn to_csv<T: Serialize>(records: &[T]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer.serialize(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| MarketError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| MarketError::InvalidParameter(format!("export is not UTF-8: {}", e)))
}

fn encode<T: Serialize>(records: &[T], format: ExportFormat) -> Result<serde_json::Value> {
    match format {
        ExportFormat::Csv => Ok(serde_json::Value::String(to_csv(records)?)),
        ExportFormat::Json => Ok(serde_json::to_value(records)?),
    }
}

pub fn export(store: &DataStore, kind: DatasetKind, format: ExportFormat) -> Result<Export> {
    let data = match kind {
        DatasetKind::Market => encode(store.market_records(), format)?,
        DatasetKind::Crop => encode(store.crop_records(), format)?,
    };
    Ok(Export { format, data })
}
