//! Sync results, statuses and critical failures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Classification of a failed remote call.
///
/// Drives control flow (retry, abort, alert); the raw message is kept
/// separately for humans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorType {
    AuthRevoked,
    StoreUnreachable,
    RateLimited,
    PartialFailure,
    Transient,
    Unknown,
}

impl_domain_status_conversions!(SyncErrorType {
    AuthRevoked => "auth_revoked",
    StoreUnreachable => "store_unreachable",
    RateLimited => "rate_limited",
    PartialFailure => "partial_failure",
    Transient => "transient",
    Unknown => "unknown",
});

/// Outcome of syncing one partner's mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartnerSyncResult {
    pub partner_shop: String,
    pub success: bool,
    pub items_processed: usize,
    pub items_updated: usize,
    pub items_failed: usize,
    pub items_skipped: usize,
    pub errors: Vec<String>,
    pub error_type: Option<SyncErrorType>,
}

impl PartnerSyncResult {
    /// Fresh, successful result for `items_processed` mappings.
    pub fn new(partner_shop: impl Into<String>, items_processed: usize) -> Self {
        Self {
            partner_shop: partner_shop.into(),
            success: true,
            items_processed,
            items_updated: 0,
            items_failed: 0,
            items_skipped: 0,
            errors: Vec::new(),
            error_type: None,
        }
    }

    /// Share of processed items whose write failed, `0.0` when nothing was
    /// processed.
    pub fn failure_rate(&self) -> f64 {
        if self.items_processed == 0 {
            return 0.0;
        }
        self.items_failed as f64 / self.items_processed as f64
    }

    /// `processed == updated + failed + skipped`.
    pub fn counts_balance(&self) -> bool {
        self.items_processed == self.items_updated + self.items_failed + self.items_skipped
    }
}

/// Aggregate over every partner handled in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySyncResult {
    pub success: bool,
    pub partners_processed: usize,
    pub items_processed: usize,
    pub items_updated: usize,
    pub items_failed: usize,
    pub items_skipped: usize,
    /// Run-level errors (preconditions, per-partner lookup faults).
    pub errors: Vec<String>,
    pub partner_results: Vec<PartnerSyncResult>,
}

impl InventorySyncResult {
    /// Successful result with nothing processed.
    pub fn empty() -> Self {
        Self {
            success: true,
            partners_processed: 0,
            items_processed: 0,
            items_updated: 0,
            items_failed: 0,
            items_skipped: 0,
            errors: Vec::new(),
            partner_results: Vec::new(),
        }
    }

    /// Failed result for a run aborted before any partner was processed.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self { success: false, errors: vec![reason.into()], ..Self::empty() }
    }

    /// Fold one partner result into the aggregate.
    pub fn absorb(&mut self, result: PartnerSyncResult) {
        self.partners_processed += 1;
        self.items_processed += result.items_processed;
        self.items_updated += result.items_updated;
        self.items_failed += result.items_failed;
        self.items_skipped += result.items_skipped;
        self.success &= result.success;
        self.partner_results.push(result);
    }

    /// Record a run-level failure that is not tied to a partner result.
    pub fn record_error(&mut self, error: impl Into<String>) {
        self.success = false;
        self.errors.push(error.into());
    }
}

/// Persisted per-partner health, derived fresh from every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerSyncStatus {
    Success,
    Warning,
    Failed,
}

impl_domain_status_conversions!(PartnerSyncStatus {
    Success => "success",
    Warning => "warning",
    Failed => "failed",
});

/// Lifecycle of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncLogStatus {
    Started,
    Completed,
    Failed,
}

impl_domain_status_conversions!(SyncLogStatus {
    Started => "started",
    Completed => "completed",
    Failed => "failed",
});

/// Kind of sync a log entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncLogType {
    Inventory,
}

impl_domain_status_conversions!(SyncLogType {
    Inventory => "inventory",
});

/// Log entry created when a partner sync starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSyncLog {
    pub partner_shop: String,
    pub log_type: SyncLogType,
    pub status: SyncLogStatus,
    pub items_processed: usize,
}

/// Final state written to a log entry once the partner sync ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLogUpdate {
    pub status: SyncLogStatus,
    pub items_processed: usize,
    pub items_updated: usize,
    pub items_failed: usize,
    pub items_skipped: usize,
    pub error_message: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Condition that warrants notifying a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalErrorKind {
    TokenRevoked,
    StoreUnreachable,
    HighFailureRate,
    ConsecutiveFailures,
    OwnerStoreDisconnected,
}

impl_domain_status_conversions!(CriticalErrorKind {
    TokenRevoked => "token_revoked",
    StoreUnreachable => "store_unreachable",
    HighFailureRate => "high_failure_rate",
    ConsecutiveFailures => "consecutive_failures",
    OwnerStoreDisconnected => "owner_store_disconnected",
});

/// Alert-worthy failure; produced for notification only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalSyncError {
    pub kind: CriticalErrorKind,
    pub partner_shop: String,
    pub message: String,
    pub details: String,
    pub failure_rate: Option<f64>,
    pub consecutive_failures: Option<u32>,
}
