//! Response cache for the block explorer API, using Moka

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use tracing::{debug, info};

use super::keys::CacheKey;

/// Status codes worth remembering. A 400 from the explorer is a stable
/// answer about the request itself, so it is cached like a 200.
pub const CACHEABLE_STATUSES: [StatusCode; 2] = [StatusCode::OK, StatusCode::BAD_REQUEST];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub body: String,
}

impl CachedResponse {
    pub fn is_cacheable(&self) -> bool {
        CACHEABLE_STATUSES.contains(&self.status)
    }
}

/// Shared TTL cache of outbound responses keyed by method + URL
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<CacheKey, Arc<CachedResponse>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<CachedResponse>> {
        let result = self.cache.get(key).await;
        if result.is_some() {
            debug!("Cache hit for {}", key);
        } else {
            debug!("Cache miss for {}", key);
        }
        result
    }

    /// Stores the response if its status is cacheable. Returns whether it was stored.
    pub async fn insert(&self, key: CacheKey, response: Arc<CachedResponse>) -> bool {
        if !response.is_cacheable() {
            debug!("Not caching {} response for {}", response.status, key);
            return false;
        }
        debug!("Cached {} response for {} with TTL {:?}", response.status, key, self.ttl);
        self.cache.insert(key, response).await;
        true
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Drops every entry. Called on shutdown.
    pub async fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        info!("Response cache cleared");
    }

    pub async fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks().await;
        self.cache.entry_count()
    }
}
