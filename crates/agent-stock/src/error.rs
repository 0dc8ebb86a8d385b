//! Error types for market data and portfolio operations

use std::path::PathBuf;
use thiserror::Error;

/// Stock data specific errors
#[derive(Debug, Error)]
pub enum StockError {
    /// Data not available for the requested symbol
    #[error("Data not available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
    },

    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// Portfolio file could not be read
    #[error("Failed to read portfolio {path}: {source}")]
    PortfolioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Portfolio file is malformed
    #[error("Invalid portfolio {path} (line {line}): {reason}")]
    PortfolioFormat {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StockError {
    /// Short category name, used when reporting failures to the agent
    pub fn kind(&self) -> &'static str {
        match self {
            StockError::DataUnavailable { .. } => "DataUnavailable",
            StockError::YahooFinanceError(_) => "YahooFinanceError",
            StockError::PortfolioIo { .. } => "PortfolioIo",
            StockError::PortfolioFormat { .. } => "PortfolioFormat",
            StockError::ConfigError(_) => "ConfigError",
        }
    }
}

/// Result type alias for stock operations
pub type Result<T> = std::result::Result<T, StockError>;
