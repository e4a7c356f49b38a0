// Domain types shared by the store, the chain client and the API layer

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked Bitcoin address with its last known USD balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub address: String,
    pub balance_usd: Decimal,
    pub added_at: i64,
}

/// Address dashboard as reported by the block explorer
#[derive(Debug, Clone, PartialEq)]
pub struct AddressData {
    /// Script type (`pubkeyhash`, `witness_v0_keyhash`, ...). `None` when the
    /// explorer has never seen the address.
    pub kind: Option<String>,
    pub balance_usd: Decimal,
    /// Transaction hashes, most recent first
    pub transactions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionData {
    pub time: DateTime<Utc>,
    pub output_total_usd: Decimal,
    pub fee_usd: Decimal,
    pub outputs: Vec<Output>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub recipient: String,
    pub value_usd: Decimal,
}

/// Display-ready projection of one transaction on a detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub amount_usd: Decimal,
    pub fee_usd: Decimal,
    pub biggest_recipient_address: String,
    pub biggest_recipient_amount_usd: Decimal,
    pub biggest_recipient_tracked: bool,
}

// API response models
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressDetail {
    pub address: Address,
    pub balance_usd: Decimal,
    pub transactions: Vec<TransactionSummary>,
    pub transactions_total: usize,
    pub page: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressList {
    pub addresses: Vec<Address>,
    pub form: FormDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<FlashMessage>,
}

/// Describes the empty "add address" form so a client can render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDescriptor {
    pub action: String,
    pub method: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FormDescriptor {
    pub fn add_address() -> Self {
        Self {
            action: "/wallets/add/".to_string(),
            method: "POST".to_string(),
            fields: vec![
                FormField {
                    name: "address".to_string(),
                    required: true,
                    max_length: Some(crate::validation::MAX_ADDRESS_LENGTH),
                },
                FormField {
                    name: "balance".to_string(),
                    required: false,
                    max_length: None,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        }
    }
}

/// One-shot message carried on the redirect that follows "add"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: MessageLevel,
    pub message: String,
}
