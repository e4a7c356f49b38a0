use crate::blockchain::models::{explorer_error, parse_address_response, parse_transactions_response};
use crate::cache::{CacheKey, CachedResponse, ResponseCache};
use crate::config::Config;
use crate::models::{AddressData, TransactionData};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The transactions dashboard accepts at most this many hashes per call
pub const TRANSACTIONS_PER_REQUEST: usize = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Remote API unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Remote data missing: {0}")]
    RemoteDataMissing(String),

    #[error("Unexpected remote response: {0}")]
    RemoteShapeError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::RemoteUnavailable(err.to_string())
    }
}

/// Result of asking the chain whether an address is known
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValidation {
    Valid { kind: String },
    Unknown,
}

/// Read access to chain data. `BlockchairClient` is the production source.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn fetch_address(&self, address: &str) -> Result<AddressData, ClientError>;

    /// Details for the given transaction hashes. Hashes the explorer does not
    /// know are simply absent from the map.
    async fn fetch_transactions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, TransactionData>, ClientError>;

    /// An address is valid on-chain when the explorer reports a script type for it
    async fn validate_address(&self, address: &str) -> Result<AddressValidation, ClientError> {
        let data = self.fetch_address(address).await?;
        Ok(match data.kind {
            Some(kind) => AddressValidation::Valid { kind },
            None => AddressValidation::Unknown,
        })
    }
}

pub struct BlockchairClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: ResponseCache,
    limiter: Option<DefaultDirectRateLimiter>,
    max_retries: usize,
}

impl BlockchairClient {
    pub fn new(config: &Config, cache: ResponseCache) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let limiter = config
            .api_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_second| RateLimiter::direct(Quota::per_second(per_second)));

        info!(
            "Initializing Blockchair client with endpoint: {}, timeout: {:?}, rate limit: {:?}",
            config.blockchair_base_url, config.http_timeout, config.api_rate_limit
        );

        Ok(Self {
            http,
            base_url: config.blockchair_base_url.trim_end_matches('/').to_string(),
            api_key: config.blockchair_api_key.clone(),
            cache,
            limiter,
            max_retries: config.api_max_retries,
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn address_url(&self, address: &str) -> String {
        format!("{}/dashboards/address/{}", self.base_url, address)
    }

    fn transactions_url(&self, ids: &[String]) -> String {
        format!("{}/dashboards/transactions/{}", self.base_url, ids.join(","))
    }

    /// GET through the response cache
    async fn get(&self, url: &str) -> Result<Arc<CachedResponse>, ClientError> {
        let key = CacheKey::get(url);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let response = (|| self.send(url))
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_millis(250))
                    .with_max_times(self.max_retries),
            )
            .when(|e| matches!(e, ClientError::RemoteUnavailable(_)))
            .notify(|e, delay| warn!("Retrying {} in {:?}: {}", url, delay, e))
            .await?;

        let response = Arc::new(response);
        self.cache.insert(key, response.clone()).await;
        Ok(response)
    }

    async fn send(&self, url: &str) -> Result<CachedResponse, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        debug!("GET {}", url);
        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RemoteUnavailable(format!(
                "{} answered {}",
                url, status
            )));
        }

        let body = response.text().await?;
        Ok(CachedResponse { status, body })
    }

    /// Body of a successful response, or the error the status stands for
    fn successful_body(response: &CachedResponse) -> Result<&str, ClientError> {
        match response.status {
            StatusCode::OK => Ok(&response.body),
            StatusCode::BAD_REQUEST => Err(ClientError::RemoteDataMissing(
                explorer_error(&response.body).unwrap_or_else(|| "bad request".to_string()),
            )),
            status => Err(ClientError::RemoteUnavailable(format!(
                "unexpected status {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl ChainSource for BlockchairClient {
    async fn fetch_address(&self, address: &str) -> Result<AddressData, ClientError> {
        if address.trim().is_empty() {
            return Err(ClientError::InvalidInput("address must not be empty".to_string()));
        }

        let response = self.get(&self.address_url(address)).await?;
        let data = parse_address_response(address, Self::successful_body(&response)?)?;
        debug!(
            "Fetched address {}: {} transactions, balance {} USD",
            address,
            data.transactions.len(),
            data.balance_usd
        );
        Ok(data)
    }

    async fn fetch_transactions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, TransactionData>, ClientError> {
        let mut transactions = HashMap::with_capacity(ids.len());

        for chunk in ids.chunks(TRANSACTIONS_PER_REQUEST) {
            let response = self.get(&self.transactions_url(chunk)).await?;
            transactions.extend(parse_transactions_response(Self::successful_body(&response)?)?);
        }

        debug!("Fetched {} of {} requested transactions", transactions.len(), ids.len());
        Ok(transactions)
    }
}
