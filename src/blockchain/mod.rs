pub mod aggregator;
pub mod client;
pub mod models;

// Re-exports for convenience
pub use aggregator::aggregate;
pub use client::{AddressValidation, BlockchairClient, ChainSource, ClientError};
