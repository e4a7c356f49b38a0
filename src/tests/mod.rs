//! Shared fixtures for the integration-style tests

mod cache_tests;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::SqlitePool;

use crate::blockchain::{ChainSource, ClientError};
use crate::config::Config;
use crate::db::connection;
use crate::models::{AddressData, Output, TransactionData};
use crate::service::WalletService;
use crate::state::AppState;

pub const GENESIS: &str = "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
pub const P2SH: &str = "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy";
pub const SEGWIT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

pub async fn memory_pool() -> SqlitePool {
    connection::establish_connection("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database")
}

pub fn tx_id(n: usize) -> String {
    format!("tx{:03}", n)
}

/// A transaction paying `value` USD to `recipient` plus a smaller change output
pub fn transaction(recipient: &str, value: i64) -> TransactionData {
    TransactionData {
        time: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        output_total_usd: Decimal::from(value + 1),
        fee_usd: Decimal::new(35, 2),
        outputs: vec![
            Output {
                recipient: "change".to_string(),
                value_usd: Decimal::ONE,
            },
            Output {
                recipient: recipient.to_string(),
                value_usd: Decimal::from(value),
            },
        ],
    }
}

/// In-process `ChainSource` with canned data and call counters
#[derive(Default)]
pub struct FakeChain {
    addresses: Mutex<HashMap<String, AddressData>>,
    transactions: Mutex<HashMap<String, TransactionData>>,
    failure: Mutex<Option<ClientError>>,
    pub address_calls: AtomicUsize,
    pub transaction_calls: AtomicUsize,
    pub requested_ids: Mutex<Vec<Vec<String>>>,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `address` with `tx_count` transactions, each paying its
    /// biggest output to `recipient`
    pub fn with_address(self, address: &str, balance: Decimal, tx_count: usize, recipient: &str) -> Self {
        let ids: Vec<String> = (0..tx_count).map(tx_id).collect();
        {
            let mut transactions = self.transactions.lock().unwrap();
            for (n, id) in ids.iter().enumerate() {
                transactions.insert(id.clone(), transaction(recipient, 10 + n as i64));
            }
        }
        self.addresses.lock().unwrap().insert(
            address.to_string(),
            AddressData {
                kind: Some("pubkeyhash".to_string()),
                balance_usd: balance,
                transactions: ids,
            },
        );
        self
    }

    /// Registers an address the explorer has never seen
    pub fn with_unknown_address(self, address: &str) -> Self {
        self.addresses.lock().unwrap().insert(
            address.to_string(),
            AddressData {
                kind: None,
                balance_usd: Decimal::ZERO,
                transactions: Vec::new(),
            },
        );
        self
    }

    pub fn failing_with(self, error: ClientError) -> Self {
        *self.failure.lock().unwrap() = Some(error);
        self
    }

    pub fn forget_transaction(&self, id: &str) {
        self.transactions.lock().unwrap().remove(id);
    }

    pub fn calls(&self) -> usize {
        self.address_calls.load(Ordering::SeqCst) + self.transaction_calls.load(Ordering::SeqCst)
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ChainSource for FakeChain {
    async fn fetch_address(&self, address: &str) -> Result<AddressData, ClientError> {
        self.address_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.addresses
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ClientError::RemoteDataMissing(format!("no data for address {}", address)))
    }

    async fn fetch_transactions(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, TransactionData>, ClientError> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        self.requested_ids.lock().unwrap().push(ids.to_vec());

        let transactions = self.transactions.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| transactions.get(id).map(|tx| (id.clone(), tx.clone())))
            .collect())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        page_size: 10,
        ..Config::default()
    }
}

pub async fn service_with(chain: Arc<FakeChain>) -> (WalletService, SqlitePool) {
    let pool = memory_pool().await;
    let service = WalletService::new(pool.clone(), chain, 10);
    (service, pool)
}

pub async fn app_state_with(chain: Arc<FakeChain>) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        db_pool: memory_pool().await,
        chain,
    })
}
