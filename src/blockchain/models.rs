use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use crate::blockchain::client::ClientError;
use crate::models::{AddressData, Output, TransactionData};

/// Blockchair reports times as UTC without an offset
const EXPLORER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    context: Option<Context>,
}

#[derive(Debug, Deserialize)]
struct Context {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressEntry {
    address: AddressInfo,
    #[serde(default)]
    transactions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AddressInfo {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    balance_usd: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct TransactionEntry {
    transaction: TransactionInfo,
    #[serde(default)]
    outputs: Vec<OutputEntry>,
}

#[derive(Debug, Deserialize)]
struct TransactionInfo {
    #[serde(deserialize_with = "explorer_time")]
    time: DateTime<Utc>,
    #[serde(default)]
    output_total_usd: Option<Decimal>,
    #[serde(default)]
    fee_usd: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
struct OutputEntry {
    recipient: String,
    #[serde(default)]
    value_usd: Option<Decimal>,
}

fn explorer_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, EXPLORER_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(de::Error::custom)
}

/// Unwraps the `data` object of an explorer response.
///
/// The explorer answers `null` or `[]` instead of an object when it has
/// nothing for the request, sometimes with `context.error` explaining why.
fn data_entries(body: &str) -> Result<Map<String, Value>, ClientError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ClientError::RemoteShapeError(format!("invalid response body: {}", e)))?;

    match envelope.data {
        Value::Object(entries) => Ok(entries),
        Value::Null => Err(missing_data(envelope.context)),
        Value::Array(items) if items.is_empty() => Err(missing_data(envelope.context)),
        other => Err(ClientError::RemoteShapeError(format!(
            "expected `data` to be an object, got {}",
            kind_of(&other)
        ))),
    }
}

fn missing_data(context: Option<Context>) -> ClientError {
    let reason = context
        .and_then(|c| c.error)
        .unwrap_or_else(|| "response carried no data".to_string());
    ClientError::RemoteDataMissing(reason)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Extracts the error message of a 400 response, if the body has one
pub fn explorer_error(body: &str) -> Option<String> {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .and_then(|envelope| envelope.context)
        .and_then(|context| context.error)
}

pub fn parse_address_response(address: &str, body: &str) -> Result<AddressData, ClientError> {
    let mut entries = data_entries(body)?;

    let entry = entries.remove(address).ok_or_else(|| {
        ClientError::RemoteDataMissing(format!("no data for address {}", address))
    })?;

    let entry: AddressEntry = serde_json::from_value(entry).map_err(|e| {
        ClientError::RemoteShapeError(format!("address {}: {}", address, e))
    })?;

    Ok(AddressData {
        kind: entry.address.kind,
        balance_usd: entry.address.balance_usd.unwrap_or_default(),
        transactions: entry.transactions,
    })
}

pub fn parse_transactions_response(
    body: &str,
) -> Result<HashMap<String, TransactionData>, ClientError> {
    let entries = data_entries(body)?;
    let mut transactions = HashMap::with_capacity(entries.len());

    for (id, entry) in entries {
        let entry: TransactionEntry = serde_json::from_value(entry)
            .map_err(|e| ClientError::RemoteShapeError(format!("transaction {}: {}", id, e)))?;

        let outputs = entry
            .outputs
            .into_iter()
            .map(|output| Output {
                recipient: output.recipient,
                value_usd: output.value_usd.unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        if outputs.is_empty() {
            warn!("Transaction {} came back without outputs", id);
        }

        transactions.insert(
            id,
            TransactionData {
                time: entry.transaction.time,
                output_total_usd: entry.transaction.output_total_usd.unwrap_or_default(),
                fee_usd: entry.transaction.fee_usd.unwrap_or_default(),
                outputs,
            },
        );
    }

    Ok(transactions)
}
