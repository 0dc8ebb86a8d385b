//! Market data and portfolio support for the portfolio agent
//!
//! This crate provides the local side of the agent's stock features:
//!
//! - Latest closing prices from Yahoo Finance behind the [`PriceSource`] trait
//! - A timed cache so repeated lookups within a run stay local
//! - [`PriceLookupTool`], the `fetch_stock_price` function exposed to the agent
//! - [`Portfolio`], the typed view of the holdings CSV
//!
//! # Example
//!
//! ```rust,ignore
//! use agent_stock::{PriceLookupTool, StockConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = StockConfig::builder().with_env().build()?;
//!     let tool = PriceLookupTool::yahoo(&config);
//!
//!     // Returns "412.345", or an error description the agent can read
//!     println!("{}", tool.fetch_price("MSFT").await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod tools;

// Re-export main types for convenience
pub use api::{PriceSource, YahooFinanceClient};
pub use cache::PriceCache;
pub use config::StockConfig;
pub use error::{Result, StockError};
pub use portfolio::{Holding, Portfolio};
pub use tools::PriceLookupTool;
