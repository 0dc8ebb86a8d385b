//! Market data sources

pub mod yahoo;

pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use async_trait::async_trait;

/// Provider of daily closing prices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Closing price of the most recent trading day
    ///
    /// Returns `Ok(None)` when the provider has no data for the symbol.
    async fn latest_close(&self, symbol: &str) -> Result<Option<f64>>;
}
