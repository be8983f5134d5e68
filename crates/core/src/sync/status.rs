//! Partner sync status and critical-failure detection.
//!
//! Status is recomputed from scratch every run; the consecutive-failure
//! counter is the only state carried between runs.

use stocksync_domain::constants::{CONSECUTIVE_FAILURE_THRESHOLD, HIGH_FAILURE_RATE_THRESHOLD};
use stocksync_domain::{
    CriticalErrorKind, CriticalSyncError, PartnerSyncResult, PartnerSyncStatus, SyncConfig,
    SyncErrorType,
};

/// Thresholds for status derivation and alerting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailurePolicy {
    /// Failure rate at or above which a run counts as failed.
    pub high_failure_rate_threshold: f64,
    /// Consecutive failed runs that trigger an alert.
    pub consecutive_failure_threshold: u32,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            high_failure_rate_threshold: HIGH_FAILURE_RATE_THRESHOLD,
            consecutive_failure_threshold: CONSECUTIVE_FAILURE_THRESHOLD,
        }
    }
}

impl FailurePolicy {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            high_failure_rate_threshold: config.high_failure_rate_threshold,
            consecutive_failure_threshold: config.consecutive_failure_threshold,
        }
    }

    /// Status from `(success, items_processed, items_failed)`.
    pub fn status(
        &self,
        success: bool,
        items_processed: usize,
        items_failed: usize,
    ) -> PartnerSyncStatus {
        if !success {
            return PartnerSyncStatus::Failed;
        }
        if items_processed == 0 {
            return PartnerSyncStatus::Success;
        }

        let rate = items_failed as f64 / items_processed as f64;
        if rate >= self.high_failure_rate_threshold {
            PartnerSyncStatus::Failed
        } else if rate > 0.0 {
            PartnerSyncStatus::Warning
        } else {
            PartnerSyncStatus::Success
        }
    }

    pub fn status_for(&self, result: &PartnerSyncResult) -> PartnerSyncStatus {
        self.status(result.success, result.items_processed, result.items_failed)
    }

    /// Reset on success, otherwise one more than before.
    pub fn next_consecutive_failures(&self, previous: u32, success: bool) -> u32 {
        if success {
            0
        } else {
            previous.saturating_add(1)
        }
    }

    /// First matching alert condition for a finished partner sync, if any.
    pub fn detect_critical_failure(
        &self,
        result: &PartnerSyncResult,
        consecutive_failures: u32,
    ) -> Option<CriticalSyncError> {
        let shop = result.partner_shop.as_str();
        let details = summarize_errors(&result.errors);

        if result.error_type == Some(SyncErrorType::AuthRevoked) {
            return Some(CriticalSyncError {
                kind: CriticalErrorKind::TokenRevoked,
                partner_shop: shop.to_string(),
                message: format!("Access to {shop} was revoked or the token is invalid"),
                details,
                failure_rate: None,
                consecutive_failures: None,
            });
        }

        if result.error_type == Some(SyncErrorType::StoreUnreachable) && !result.success {
            return Some(CriticalSyncError {
                kind: CriticalErrorKind::StoreUnreachable,
                partner_shop: shop.to_string(),
                message: format!("{shop} could not be reached"),
                details,
                failure_rate: None,
                consecutive_failures: None,
            });
        }

        let failure_rate = result.failure_rate();
        if result.items_processed > 0 && failure_rate >= self.high_failure_rate_threshold {
            return Some(CriticalSyncError {
                kind: CriticalErrorKind::HighFailureRate,
                partner_shop: shop.to_string(),
                message: format!(
                    "{:.0}% of inventory updates failed for {shop} ({} of {})",
                    failure_rate * 100.0,
                    result.items_failed,
                    result.items_processed
                ),
                details,
                failure_rate: Some(failure_rate),
                consecutive_failures: None,
            });
        }

        if consecutive_failures >= self.consecutive_failure_threshold {
            return Some(CriticalSyncError {
                kind: CriticalErrorKind::ConsecutiveFailures,
                partner_shop: shop.to_string(),
                message: format!("{shop} has failed {consecutive_failures} consecutive syncs"),
                details,
                failure_rate: None,
                consecutive_failures: Some(consecutive_failures),
            });
        }

        None
    }
}

/// Alert raised when the owner store cannot be used for a run.
pub fn owner_store_disconnected(shop: Option<&str>, reason: &str) -> CriticalSyncError {
    let shop = shop.unwrap_or("owner store");
    CriticalSyncError {
        kind: CriticalErrorKind::OwnerStoreDisconnected,
        partner_shop: shop.to_string(),
        message: "Your store is disconnected; inventory sync is paused for all partners"
            .to_string(),
        details: reason.to_string(),
        failure_rate: None,
        consecutive_failures: None,
    }
}

fn summarize_errors(errors: &[String]) -> String {
    const MAX_ERRORS: usize = 3;
    if errors.is_empty() {
        return "No error details were reported.".to_string();
    }
    let mut summary = errors.iter().take(MAX_ERRORS).cloned().collect::<Vec<_>>().join("\n");
    if errors.len() > MAX_ERRORS {
        summary.push_str(&format!("\n(+{} more)", errors.len() - MAX_ERRORS));
    }
    summary
}
