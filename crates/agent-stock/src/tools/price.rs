//! Latest closing price lookup, exposed to the agent as `fetch_stock_price`

use agent_tools::{Tool, schema};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::{PriceSource, YahooFinanceClient};
use crate::cache::PriceCache;
use crate::config::StockConfig;

/// Function name the agent uses to request a price
pub const FETCH_STOCK_PRICE: &str = "fetch_stock_price";

/// Tool returning the most recent daily close for a ticker
///
/// Every outcome is a string: the rounded price, or a description of why
/// there is none. Nothing is propagated to the caller.
pub struct PriceLookupTool {
    source: Arc<dyn PriceSource>,
    cache: Option<PriceCache>,
}

impl PriceLookupTool {
    /// Create a lookup over any price source
    pub fn new(source: Arc<dyn PriceSource>, config: &StockConfig) -> Self {
        Self {
            source,
            cache: config.price_cache_ttl.map(PriceCache::new),
        }
    }

    /// Create a lookup backed by Yahoo Finance
    pub fn yahoo(config: &StockConfig) -> Self {
        Self::new(Arc::new(YahooFinanceClient::new()), config)
    }

    /// Fetch the latest closing price for `ticker`
    ///
    /// - data available: the close rounded to 3 decimals, e.g. `"412.345"`
    /// - no data: `"No data found for ticker MSFT"`
    /// - provider failure: `"Error fetching price for MSFT: <category>: <message>"`
    pub async fn fetch_price(&self, ticker: &str) -> String {
        let symbol = ticker.trim().to_uppercase();
        if symbol.is_empty() {
            return "Error fetching price: ticker must not be empty".to_string();
        }

        let lookup = || self.source.latest_close(&symbol);
        let result = match &self.cache {
            Some(cache) => cache.get_or_fetch(&symbol, lookup).await,
            None => lookup().await,
        };

        match result {
            Ok(Some(close)) => {
                let price = format_price(close);
                info!(symbol = %symbol, price = %price, "Fetched closing price");
                price
            }
            Ok(None) => {
                warn!(symbol = %symbol, "No price data found");
                format!("No data found for ticker {symbol}")
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "Price lookup failed");
                format!("Error fetching price for {symbol}: {}: {e}", e.kind())
            }
        }
    }
}

/// Round to 3 decimal places, printing the shortest form (`150.5`, `412.345`)
fn format_price(close: f64) -> String {
    let rounded = (close * 1000.0).round() / 1000.0;
    format!("{rounded}")
}

#[async_trait]
impl Tool for PriceLookupTool {
    async fn call(&self, arguments: Value) -> String {
        debug!(arguments = %arguments, "fetch_stock_price called");
        match arguments.get("ticker").and_then(Value::as_str) {
            Some(ticker) => self.fetch_price(ticker).await,
            None => format!("Error: {FETCH_STOCK_PRICE} requires a string 'ticker' argument"),
        }
    }

    fn name(&self) -> &'static str {
        FETCH_STOCK_PRICE
    }

    fn description(&self) -> &'static str {
        "Fetch the most recent daily closing price for a stock ticker symbol. \
         Returns the price as a number rounded to 3 decimals, or a message explaining \
         why no price is available."
    }

    fn parameters(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Stock ticker symbol (e.g., 'MSFT', 'AAPL')"),
            }),
            vec!["ticker"],
        )
    }
}
