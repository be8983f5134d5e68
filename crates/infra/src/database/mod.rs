//! SQLite persistence for mappings, partner state and run logs.

pub mod manager;
mod sync_store;

pub use manager::{DbConnection, DbManager};
pub use sync_store::{NewPartner, PartnerHealth, SqliteSyncStore, SyncLogRow};
