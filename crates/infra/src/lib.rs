//! # StockSync Infrastructure
//!
//! Infrastructure implementations of core sync ports.
//!
//! This crate contains:
//! - SQLite stores for mappings, partner state and run logs
//! - The GraphQL commerce client and the shared HTTP client
//! - Alert email delivery
//! - Configuration loading, tracing setup and the run lock
//!
//! ## Architecture
//! - Implements traits defined in `stocksync-core`
//! - Contains all "impure" code (I/O, network, filesystem)

pub mod alerts;
pub mod commerce;
pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod run_lock;
pub mod token_provider;

// Re-export commonly used items
pub use alerts::{alert_transport, HttpAlertTransport, LogOnlyAlertTransport};
pub use commerce::{CommerceClient, CommerceError};
pub use database::{DbManager, SqliteSyncStore};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
pub use run_lock::RunLock;
pub use token_provider::StaticTokenProvider;
