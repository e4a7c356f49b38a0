use std::str::FromStr;

use bech32::{FromBase32, Variant};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

/// Longest address the store accepts
pub const MAX_ADDRESS_LENGTH: usize = 100;

const P2PKH_VERSION: u8 = 0x00;
const P2SH_VERSION: u8 = 0x05;
const SEGWIT_HRP: &str = "bc";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("{field} is longer than {max} characters")]
    TooLong { field: String, max: usize },

    #[error("Invalid Bitcoin address format: {0}")]
    InvalidBitcoinAddress(String),

    #[error("Address {0} is not known on-chain")]
    UnknownOnChain(String),
}

/// Raw "add address" form fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddAddressForm {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
}

/// An add-address form that passed local validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidAddressForm {
    pub address: String,
    pub balance_usd: Decimal,
}

impl AddAddressForm {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            balance: None,
        }
    }

    pub fn with_balance(mut self, balance: impl Into<String>) -> Self {
        self.balance = Some(balance.into());
        self
    }

    /// The submitted address, or `"invalid"` when none was sent
    pub fn address_label(&self) -> &str {
        self.address.as_deref().map(str::trim).unwrap_or("invalid")
    }

    /// Syntactic validation only; nothing here touches the network.
    /// An unparseable balance falls back to zero.
    pub fn validate(&self) -> Result<ValidAddressForm, ValidationError> {
        let address = self
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ValidationError::MissingParameter("address".to_string()))?;

        if address.chars().count() > MAX_ADDRESS_LENGTH {
            return Err(ValidationError::TooLong {
                field: "address".to_string(),
                max: MAX_ADDRESS_LENGTH,
            });
        }

        validate_bitcoin_address(address)?;

        let balance_usd = self
            .balance
            .as_deref()
            .and_then(|raw| Decimal::from_str(raw.trim()).ok())
            .unwrap_or_default();

        Ok(ValidAddressForm {
            address: address.to_string(),
            balance_usd,
        })
    }
}

/// Accepts mainnet P2PKH/P2SH (base58check) and segwit (bech32/bech32m) addresses
pub fn validate_bitcoin_address(address: &str) -> Result<(), ValidationError> {
    if address.trim().is_empty() {
        return Err(ValidationError::MissingParameter("address".to_string()));
    }

    let lowered = address.to_ascii_lowercase();
    let valid = if lowered.starts_with("bc1") {
        is_segwit_address(address)
    } else {
        is_base58_address(address)
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidBitcoinAddress(address.to_string()))
    }
}

fn is_base58_address(address: &str) -> bool {
    match bs58::decode(address).with_check(None).into_vec() {
        Ok(payload) => {
            payload.len() == 21 && matches!(payload[0], P2PKH_VERSION | P2SH_VERSION)
        }
        Err(_) => false,
    }
}

fn is_segwit_address(address: &str) -> bool {
    let Ok((hrp, data, variant)) = bech32::decode(address) else {
        return false;
    };
    if hrp != SEGWIT_HRP || data.is_empty() {
        return false;
    }

    let version = data[0].to_u8();
    let Ok(program) = Vec::<u8>::from_base32(&data[1..]) else {
        return false;
    };

    match version {
        0 => variant == Variant::Bech32 && matches!(program.len(), 20 | 32),
        1..=16 => variant == Variant::Bech32m && (2..=40).contains(&program.len()),
        _ => false,
    }
}
