//! Configuration for price lookups

use crate::error::{Result, StockError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the price cache TTL, in seconds
pub const PRICE_CACHE_TTL_ENV: &str = "PRICE_CACHE_TTL_SECS";

/// Configuration for price lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockConfig {
    /// How long a fetched close stays cached; `None` disables caching
    pub price_cache_ttl: Option<Duration>,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            price_cache_ttl: Some(Duration::from_secs(60)), // 1 minute
        }
    }
}

impl StockConfig {
    /// Create a new configuration builder
    pub fn builder() -> StockConfigBuilder {
        StockConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.price_cache_ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(StockError::ConfigError(
                "price_cache_ttl must be greater than 0 (use None to disable caching)".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for StockConfig
#[derive(Debug, Default)]
pub struct StockConfigBuilder {
    price_cache_ttl: Option<Option<Duration>>,
    env_ttl: Option<String>,
}

impl StockConfigBuilder {
    /// Set cache TTL for closing prices
    pub fn price_cache_ttl(mut self, duration: Duration) -> Self {
        self.price_cache_ttl = Some(Some(duration));
        self
    }

    /// Always go to the provider
    pub fn disable_cache(mut self) -> Self {
        self.price_cache_ttl = Some(None);
        self
    }

    /// Read `PRICE_CACHE_TTL_SECS` from the environment (`0` disables caching)
    ///
    /// Explicit builder settings take precedence.
    pub fn with_env(mut self) -> Self {
        self.env_ttl = agent_utils::optional_var(PRICE_CACHE_TTL_ENV);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<StockConfig> {
        let defaults = StockConfig::default();

        let env_ttl = match self.env_ttl {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    StockError::ConfigError(format!(
                        "{PRICE_CACHE_TTL_ENV} must be a whole number of seconds, got '{raw}'"
                    ))
                })?;
                Some((secs > 0).then(|| Duration::from_secs(secs)))
            }
            None => None,
        };

        let config = StockConfig {
            price_cache_ttl: self
                .price_cache_ttl
                .or(env_ttl)
                .unwrap_or(defaults.price_cache_ttl),
        };

        config.validate()?;
        Ok(config)
    }
}
