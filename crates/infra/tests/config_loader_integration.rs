//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use stocksync_core::TokenProvider;
use stocksync_infra::config;
use stocksync_infra::token_provider::StaticTokenProvider;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn test_load_config_from_json_file() {
    let json_content = r#"{
        "sync": {
            "write_batch_size": 5,
            "retry_delays_ms": [50, 250]
        },
        "database": {
            "path": "/tmp/integration_test.db",
            "pool_size": 6
        },
        "alerts": {
            "enabled": true,
            "api_key": "re_test",
            "to": ["ops@example.com"]
        }
    }"#;

    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(json_content.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension("json");
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");

    let config = config::load_from_file(Some(path.clone())).expect("JSON config should load");

    assert_eq!(config.sync.write_batch_size, 5);
    assert_eq!(config.sync.retry_delays_ms, vec![50, 250]);
    assert_eq!(config.sync.fetch_batch_size, 250);
    assert_eq!(config.database.path, "/tmp/integration_test.db");
    assert_eq!(config.database.pool_size, 6);
    assert!(config.alerts.enabled);
    assert_eq!(config.alerts.api_key.as_deref(), Some("re_test"));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_config_from_toml_file() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("stocksync.toml");
    std::fs::write(
        &path,
        r#"
        [commerce]
        api_version = "2025-01"

        [logging]
        level = "debug"
        json = true
        "#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("TOML config should load");

    assert_eq!(config.commerce.api_version, "2025-01");
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.json);
    assert_eq!(config.sync.write_batch_size, 10);
}

#[test]
fn test_invalid_file_contents_are_config_errors() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[sync\nwrite_batch_size = ").expect("Failed to write config");

    let err = config::load_from_file(Some(path)).expect_err("malformed TOML should fail");
    assert!(err.to_string().contains("Invalid TOML format"));
}

#[tokio::test]
async fn test_owner_store_from_file_feeds_token_provider() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("stocksync.toml");
    std::fs::write(
        &path,
        r#"
        [owner_store]
        shop = "owner.myshopify.com"
        access_token = "shpat_owner"
        "#,
    )
    .expect("Failed to write config");

    let config = config::load_from_file(Some(path)).expect("TOML config should load");
    let connection = StaticTokenProvider::new(&config.owner_store)
        .get_valid_credential()
        .await
        .expect("static provider never errors");

    assert_eq!(
        connection.usable().expect_err("location is missing"),
        "owner store location id is not configured"
    );
}
