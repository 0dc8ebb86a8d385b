//! Caching layer for closing prices to reduce API calls

use cached::{Cached, TimedCache};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Thread-safe timed cache of closing prices, keyed by upper-cased symbol
///
/// Only successful lookups are stored; "no data" and failures always go back
/// to the provider.
#[derive(Clone)]
pub struct PriceCache {
    cache: Arc<RwLock<TimedCache<String, f64>>>,
}

impl PriceCache {
    /// Create a new cache with specified TTL
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Arc::new(RwLock::new(TimedCache::with_lifespan(ttl))),
        }
    }

    /// Get a price from the cache
    pub async fn get(&self, symbol: &str) -> Option<f64> {
        let mut cache = self.cache.write().await;
        cache.cache_get(&symbol.to_uppercase()).copied()
    }

    /// Insert a price into the cache
    pub async fn insert(&self, symbol: &str, price: f64) {
        let mut cache = self.cache.write().await;
        let _ = cache.cache_set(symbol.to_uppercase(), price);
    }

    /// Get or fetch a price using the provided fetcher function
    ///
    /// If the price is cached it's returned immediately. Otherwise the
    /// fetcher is called and a `Some` result is cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, symbol: &str, fetcher: F) -> Result<Option<f64>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<f64>, E>>,
    {
        if let Some(price) = self.get(symbol).await {
            tracing::debug!(symbol = %symbol, "Price cache hit");
            return Ok(Some(price));
        }

        tracing::debug!(symbol = %symbol, "Price cache miss");

        let price = fetcher().await?;
        if let Some(p) = price {
            self.insert(symbol, p).await;
        }

        Ok(price)
    }

    /// Clear all cached entries
    pub async fn clear(&self) {
        let mut cache = self.cache.write().await;
        cache.cache_clear();
    }

    /// Get the number of cached entries
    pub async fn len(&self) -> usize {
        let cache = self.cache.read().await;
        cache.cache_size()
    }

    /// Check if the cache is empty
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
