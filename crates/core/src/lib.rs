//! # StockSync Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Error classification and the retry executor
//! - The batched fetch / resolve / write pipeline
//! - Partner and run orchestration, status derivation, critical-failure
//!   detection and alert rendering
//! - Port/adapter interfaces (traits) for every external collaborator
//!
//! ## Architecture Principles
//! - Only depends on `stocksync-domain`
//! - No database, HTTP, or email code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod sync;

// Re-export specific items to avoid ambiguity
pub use sync::alerts::render_alert;
pub use sync::classifier::classify_error;
pub use sync::partner::PartnerSynchronizer;
pub use sync::pipeline::{BatchPipeline, FetchOutcome, PipelineSettings, ResolveOutcome, WriteOutcome};
pub use sync::ports::{
    AlertTransport, InventoryApi, MappingStore, PartnerCredentialStore, PartnerStateStore,
    SyncLogStore, TokenProvider,
};
pub use sync::retry::{with_retry, AttemptFailure, RetryFailure, RetryOutcome, RetryPolicy};
pub use sync::service::{InventorySyncService, SyncPorts};
pub use sync::status::FailurePolicy;
