//! Integration tests for sync result and configuration types
//!
//! Exercises the public domain surface the way the adapters use it: JSON
//! summaries, persisted status strings and config files.

use std::str::FromStr;

use stocksync_domain::{
    Config, InventorySyncResult, PartnerCredential, PartnerSyncResult, PartnerSyncStatus,
    StockSyncError, SyncErrorType, SyncLogStatus,
};

// ============================================================================
// Run summaries
// ============================================================================

#[test]
fn test_run_summary_round_trips_through_json() {
    let mut total = InventorySyncResult::empty();
    total.absorb(PartnerSyncResult {
        items_updated: 8,
        items_skipped: 2,
        ..PartnerSyncResult::new("a.myshopify.com", 10)
    });
    total.absorb(PartnerSyncResult {
        success: false,
        error_type: Some(SyncErrorType::AuthRevoked),
        errors: vec!["Fetch batch 1/1 failed (auth_revoked): Unauthorized".into()],
        ..PartnerSyncResult::new("b.myshopify.com", 4)
    });
    total.record_error("c.myshopify.com: credential lookup failed: database is locked");

    let json = serde_json::to_string(&total).unwrap();
    let back: InventorySyncResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back, total);
    assert!(!back.success);
    assert_eq!(back.items_processed, 14);
    assert!(back.partner_results[0].counts_balance());
    assert!(!back.partner_results[1].counts_balance());
}

// ============================================================================
// Persisted status strings
// ============================================================================

#[test]
fn test_persisted_strings_parse_back() {
    for status in [PartnerSyncStatus::Success, PartnerSyncStatus::Warning, PartnerSyncStatus::Failed]
    {
        assert_eq!(PartnerSyncStatus::from_str(status.as_str()), Ok(status));
    }
    for status in [SyncLogStatus::Started, SyncLogStatus::Completed, SyncLogStatus::Failed] {
        assert_eq!(SyncLogStatus::from_str(&status.to_string()), Ok(status));
    }
    assert!(SyncErrorType::from_str("exploded").is_err());
}

// ============================================================================
// Credentials and configuration
// ============================================================================

#[test]
fn test_partner_credential_never_serializes_token() {
    let credential = PartnerCredential {
        shop: "a.myshopify.com".into(),
        access_token: Some("shpat_secret".into()),
        is_active: true,
        is_deleted: false,
    };

    let json = serde_json::to_string(&credential).unwrap();
    assert!(!json.contains("shpat_secret"));
    assert!(credential.session().is_some());
}

#[test]
fn test_config_from_json_keeps_defaults() {
    let config: Config = serde_json::from_str(
        r#"{ "sync": { "consecutive_failure_threshold": 5 }, "logging": { "json": true } }"#,
    )
    .unwrap();

    assert_eq!(config.sync.consecutive_failure_threshold, 5);
    assert_eq!(config.sync.high_failure_rate_threshold, 0.5);
    assert!(config.logging.json);
    assert_eq!(config.logging.level, "info");
    assert!(config.owner_store.shop.is_none());
}

#[test]
fn test_errors_carry_stable_labels() {
    let err = StockSyncError::Database("database is locked".into());
    assert_eq!(err.label(), "database");
    assert_eq!(err.to_string(), "Database error: database is locked");
}
