//! Activity ingestion for Panna wallets: pulls an address's transactions from a
//! Blockscout explorer, labels each one, and serves them through a paginated cache.

pub mod api;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod error;
pub mod explorer;
pub mod merger;
pub mod models;
pub mod projector;

#[cfg(test)]
mod fixtures;

pub use cache::{ActivityCache, ActivityService};
pub use classifier::classify_amount_type;
pub use error::{ActivityError, ExplorerError, InvalidTransactionError};
pub use explorer::{BlockscoutClient, Explorer};
pub use merger::merge_token_transfers;
pub use projector::{project_activities, project_activity};
