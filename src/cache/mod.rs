pub mod keys;
pub mod response;

pub use keys::CacheKey;
pub use response::{CachedResponse, ResponseCache};

use crate::config::Config;

pub fn init_cache(config: &Config) -> ResponseCache {
    ResponseCache::new(config.cache_max_capacity, config.cache_ttl)
}
