pub mod api;
pub mod blockchain;
pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod pagination;
pub mod service;
pub mod validation;
pub mod state;

#[cfg(test)]
pub mod tests;

// Re-export specific items for convenience if desired
pub use db::connection;
pub use db::address;
pub use models::{Address, TransactionSummary};
pub use pagination::{paginate, Page};
pub use validation::{validate_bitcoin_address, AddAddressForm};
pub use api::error::ApiError;
pub use api::response::ApiResponse;
pub use api::route::create_router;
pub use service::{AddOutcome, WalletService};
