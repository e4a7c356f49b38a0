use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::db::StoreError;
use crate::models::Address;

/// Balances are kept with three decimal places
pub const BALANCE_SCALE: u32 = 3;

fn address_from_row(row: &SqliteRow) -> Result<Address, sqlx::Error> {
    let balance: String = row.try_get("balance_usd")?;
    let balance_usd = Decimal::from_str(&balance).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(Address {
        id: row.try_get("id")?,
        address: row.try_get("address")?,
        balance_usd,
        added_at: row.try_get("added_at")?,
    })
}

pub async fn add_address(
    pool: &Pool<Sqlite>,
    address: &str,
    balance_usd: Decimal,
) -> Result<Address, StoreError> {
    let now = chrono::Utc::now().timestamp();
    let balance_usd = balance_usd.round_dp(BALANCE_SCALE);

    let result = sqlx::query(
        "INSERT INTO wallet_addresses (address, balance_usd, added_at) VALUES (?, ?, ?)",
    )
    .bind(address)
    .bind(balance_usd.to_string())
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            StoreError::DuplicateAddress(address.to_string())
        }
        other => StoreError::Database(other),
    })?;

    Ok(Address {
        id: result.last_insert_rowid(),
        address: address.to_string(),
        balance_usd,
        added_at: now,
    })
}

pub async fn get_address(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Address>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, address, balance_usd, added_at FROM wallet_addresses WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(address_from_row).transpose()
}

/// All tracked addresses, most recently added first
pub async fn list_addresses(pool: &Pool<Sqlite>) -> Result<Vec<Address>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, address, balance_usd, added_at FROM wallet_addresses ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(address_from_row).collect()
}

pub async fn update_balance(
    pool: &Pool<Sqlite>,
    id: i64,
    balance_usd: Decimal,
) -> Result<Decimal, sqlx::Error> {
    let balance_usd = balance_usd.round_dp(BALANCE_SCALE);

    sqlx::query("UPDATE wallet_addresses SET balance_usd = ? WHERE id = ?")
        .bind(balance_usd.to_string())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(balance_usd)
}

pub async fn is_address_tracked(pool: &Pool<Sqlite>, address: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("SELECT id FROM wallet_addresses WHERE address = ?")
        .bind(address)
        .fetch_optional(pool)
        .await?;

    Ok(result.is_some())
}

/// The subset of `candidates` that is tracked
pub async fn tracked_among(
    pool: &Pool<Sqlite>,
    candidates: &HashSet<String>,
) -> Result<HashSet<String>, sqlx::Error> {
    let mut tracked = HashSet::new();
    for candidate in candidates {
        if is_address_tracked(pool, candidate).await? {
            tracked.insert(candidate.clone());
        }
    }
    Ok(tracked)
}

pub async fn count_addresses(pool: &Pool<Sqlite>) -> Result<i64, sqlx::Error> {
    let count = sqlx::query("SELECT COUNT(*) FROM wallet_addresses")
        .fetch_one(pool)
        .await?
        .get::<i64, _>(0);

    Ok(count)
}
