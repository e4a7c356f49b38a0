// Configuration structure for:
// - Database connection string
// - Server listening address/port
// - Blockchair endpoint, API key, timeout, rate limit and retries
// - Response cache settings (size, TTL)
// - Detail page size

use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub blockchair_base_url: String,
    pub blockchair_api_key: Option<String>,
    pub cache_ttl: Duration,
    pub cache_max_capacity: u64,
    pub http_timeout: Duration,
    pub api_rate_limit: Option<u32>,
    pub api_max_retries: usize,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:wallets.db".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 8080,
            blockchair_base_url: "https://api.blockchair.com/bitcoin".to_string(),
            blockchair_api_key: None,
            cache_ttl: Duration::from_secs(15 * 60),
            cache_max_capacity: 1000,
            http_timeout: Duration::from_secs(30),
            api_rate_limit: None,
            api_max_retries: 3,
            page_size: 10,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();
        let defaults = Config::default();

        let database_url = env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = parse_or("SERVER_PORT", defaults.server_port);
        let blockchair_base_url = env::var("BLOCKCHAIR_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.blockchair_base_url);
        let blockchair_api_key = env::var("BLOCKCHAIR_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let cache_ttl = Duration::from_secs(parse_or("CACHE_TTL", defaults.cache_ttl.as_secs()));
        let cache_max_capacity = parse_or("CACHE_MAX_CAPACITY", defaults.cache_max_capacity);
        let http_timeout =
            Duration::from_secs(parse_or("HTTP_TIMEOUT_SECS", defaults.http_timeout.as_secs()));
        let api_rate_limit = env::var("API_RATE_LIMIT")
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .filter(|limit: &u32| *limit > 0);
        let api_max_retries = parse_or("API_MAX_RETRIES", defaults.api_max_retries);
        let page_size = parse_or("PAGE_SIZE", defaults.page_size).max(1);

        Self {
            database_url,
            server_host,
            server_port,
            blockchair_base_url,
            blockchair_api_key,
            cache_ttl,
            cache_max_capacity,
            http_timeout,
            api_rate_limit,
            api_max_retries,
            page_size,
        }
    }
}
