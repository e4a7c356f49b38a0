//! Address list, detail and add operations

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::blockchain::aggregator::{aggregate, recipient_candidates};
use crate::blockchain::client::{AddressValidation, ChainSource, ClientError};
use crate::db::{address, StoreError};
use crate::models::{
    Address, AddressDetail, AddressList, FlashMessage, FormDescriptor, MessageLevel,
};
use crate::pagination::paginate;
use crate::validation::{AddAddressForm, ValidationError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Address {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Store(StoreError::Database(err))
    }
}

/// Why an address could not be added
#[derive(Error, Debug)]
pub enum AddError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("address '{0}' is already tracked")]
    DuplicateAddress(String),

    #[error(transparent)]
    Remote(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for AddError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateAddress(address) => AddError::DuplicateAddress(address),
            StoreError::Database(e) => AddError::Database(e),
        }
    }
}

/// Result of an "add" request together with the message to show the user
#[derive(Debug)]
pub struct AddOutcome {
    pub result: Result<Address, AddError>,
    pub message: FlashMessage,
}

impl AddOutcome {
    fn added(address: Address) -> Self {
        let message = FlashMessage {
            level: MessageLevel::Success,
            message: format!("now tracking address '{}'", address.address),
        };
        Self {
            result: Ok(address),
            message,
        }
    }

    fn failed(label: &str, err: AddError) -> Self {
        let message = match &err {
            AddError::Validation(reason) => {
                format!("form is not valid for bitcoin address '{}': {}", label, reason)
            }
            AddError::DuplicateAddress(_) | AddError::Database(_) => {
                format!("was not able to store address '{}' in database: {}", label, err)
            }
            AddError::Remote(reason) => {
                format!("could not verify bitcoin address '{}': {}", label, reason)
            }
        };
        Self {
            result: Err(err),
            message: FlashMessage {
                level: MessageLevel::Error,
                message,
            },
        }
    }

    /// Message for a request that reached the add route with the wrong method
    pub fn wrong_method() -> FlashMessage {
        FlashMessage {
            level: MessageLevel::Warning,
            message: "invalid API call to /wallets/add/".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct WalletService {
    pool: SqlitePool,
    chain: Arc<dyn ChainSource>,
    page_size: usize,
}

impl WalletService {
    pub fn new(pool: SqlitePool, chain: Arc<dyn ChainSource>, page_size: usize) -> Self {
        Self {
            pool,
            chain,
            page_size: page_size.max(1),
        }
    }

    /// Every tracked address, newest first, with the empty add form
    pub async fn list(&self) -> Result<AddressList, ServiceError> {
        let addresses = address::list_addresses(&self.pool).await?;
        debug!("Listing {} tracked addresses", addresses.len());

        Ok(AddressList {
            addresses,
            form: FormDescriptor::add_address(),
            message: None,
        })
    }

    pub async fn detail(
        &self,
        id: i64,
        page_param: Option<&str>,
    ) -> Result<AddressDetail, ServiceError> {
        let mut tracked = address::get_address(&self.pool, id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;

        let data = self.chain.fetch_address(&tracked.address).await?;
        tracked.balance_usd = address::update_balance(&self.pool, id, data.balance_usd).await?;

        let total = data.transactions.len();
        let page = paginate(total, page_param, self.page_size);
        let page_ids = &data.transactions[page.range(total)];

        let tx_data = if page_ids.is_empty() {
            HashMap::new()
        } else {
            self.chain.fetch_transactions(page_ids).await?
        };

        let candidates = recipient_candidates(page_ids, &tx_data);
        let known = address::tracked_among(&self.pool, &candidates).await?;
        let transactions = aggregate(page_ids, &tx_data, &known)?;

        info!(
            "Address {} detail: page {}/{} of {} transactions, balance {} USD",
            tracked.address, page.page, page.page_count, total, data.balance_usd
        );

        Ok(AddressDetail {
            address: tracked,
            balance_usd: data.balance_usd,
            transactions,
            transactions_total: total,
            page: page.page,
            page_count: page.page_count,
        })
    }

    /// Validates and stores a new address. Failures are reported in the
    /// outcome and leave the store untouched.
    pub async fn add(&self, form: &AddAddressForm) -> AddOutcome {
        let label = form.address_label().to_string();

        match self.try_add(form).await {
            Ok(address) => {
                info!("Added address {} to tracking", address.address);
                AddOutcome::added(address)
            }
            Err(err) => {
                warn!("Could not add address '{}': {}", label, err);
                AddOutcome::failed(&label, err)
            }
        }
    }

    async fn try_add(&self, form: &AddAddressForm) -> Result<Address, AddError> {
        let valid = form.validate()?;

        // Skips the explorer round trip; the UNIQUE constraint still guards the insert
        if address::is_address_tracked(&self.pool, &valid.address).await? {
            return Err(AddError::DuplicateAddress(valid.address));
        }

        match self.chain.validate_address(&valid.address).await? {
            AddressValidation::Valid { kind } => {
                debug!("Address {} is a {} address", valid.address, kind)
            }
            AddressValidation::Unknown => {
                return Err(ValidationError::UnknownOnChain(valid.address).into())
            }
        }

        Ok(address::add_address(&self.pool, &valid.address, valid.balance_usd).await?)
    }
}
