//! Yahoo Finance API client

use crate::api::PriceSource;
use crate::error::{Result, StockError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance API client
#[derive(Debug, Clone, Default)]
pub struct YahooFinanceClient {}

/// Daily quote data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

impl YahooFinanceClient {
    /// Create a new Yahoo Finance client
    pub fn new() -> Self {
        Self {}
    }

    /// Get the most recent daily quote for a symbol
    ///
    /// Returns `Ok(None)` when Yahoo has no quotes for the symbol.
    pub async fn latest_daily_quote(&self, symbol: &str) -> Result<Option<Quote>> {
        let provider = yahoo::YahooConnector::new()
            .map_err(|e| StockError::YahooFinanceError(e.to_string()))?;

        let response = match provider.get_latest_quotes(symbol, "1d").await {
            Ok(response) => response,
            Err(e) if is_no_data(&e) => return Ok(None),
            Err(e) => return Err(StockError::YahooFinanceError(e.to_string())),
        };

        let quote = match response.last_quote() {
            Ok(quote) => quote,
            Err(e) if is_no_data(&e) => return Ok(None),
            Err(e) => return Err(StockError::YahooFinanceError(e.to_string())),
        };

        Ok(Some(Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(quote.timestamp as i64, 0)
                .unwrap_or_else(Utc::now),
            open: quote.open,
            high: quote.high,
            low: quote.low,
            close: quote.close,
            volume: quote.volume,
            adjclose: quote.adjclose,
        }))
    }
}

/// Yahoo signals "nothing for this symbol" through these variants
fn is_no_data(err: &yahoo::YahooError) -> bool {
    matches!(
        err,
        yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult
    )
}

#[async_trait]
impl PriceSource for YahooFinanceClient {
    async fn latest_close(&self, symbol: &str) -> Result<Option<f64>> {
        let Some(quote) = self.latest_daily_quote(symbol).await? else {
            return Ok(None);
        };
        debug!(symbol = %symbol, close = quote.close, date = %quote.timestamp.date_naive(), "Fetched daily close");

        if !quote.close.is_finite() {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("close for {} is not a number", quote.timestamp.date_naive()),
            });
        }
        Ok(Some(quote.close))
    }
}
