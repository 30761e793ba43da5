//! Error types for the market_insight crate

use crop_math::MathError;
use thiserror::Error;

/// Custom error types for the market_insight crate
#[derive(Debug, Error)]
pub enum MarketError {
    /// The table, or its filtered subset, is empty
    #[error("Missing data: {0}")]
    MissingData(String),

    /// Fewer than two points where a ratio or derivative is needed
    #[error("Insufficient series: {0}")]
    InsufficientSeries(String),

    /// Unrecognized crop, region, format or operator
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A serialized model could not be read; callers fall back to the naive forecaster
    #[error("Model load failure: {0}")]
    ModelLoad(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from JSON encoding or decoding
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the statistical kernels
    #[error("Math error: {0}")]
    Math(#[from] MathError),
}

impl MarketError {
    /// Stable snake_case name of the variant, reported at the response boundary
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::MissingData(_) => "missing_data",
            MarketError::InsufficientSeries(_) => "insufficient_series",
            MarketError::InvalidParameter(_) => "invalid_parameter",
            MarketError::ModelLoad(_) => "model_load_failure",
            MarketError::Io(_) => "io",
            MarketError::Csv(_) => "csv",
            MarketError::Json(_) => "json",
            MarketError::Math(_) => "math",
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_conversion() {
        let err = MarketError::from(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        assert!(matches!(err, MarketError::Io(_)));
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_math_conversion() {
        let err = MarketError::from(MathError::InsufficientData("2 points".to_string()));
        assert_eq!(err.kind(), "math");
        assert!(err.to_string().contains("2 points"));
    }

    #[test]
    fn test_display() {
        let err = MarketError::InvalidParameter("format 'xml'".to_string());
        assert_eq!(err.to_string(), "Invalid parameter: format 'xml'");
        assert_eq!(err.kind(), "invalid_parameter");
    }
}
