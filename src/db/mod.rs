pub mod address;
pub mod connection;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("address '{0}' is already tracked")]
    DuplicateAddress(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub const INIT_SCHEMA: &str = r#"
-- Tracked addresses, id order is insertion order
CREATE TABLE IF NOT EXISTS wallet_addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    address TEXT NOT NULL UNIQUE,
    balance_usd TEXT NOT NULL DEFAULT '0',
    added_at INTEGER NOT NULL
);
"#;
