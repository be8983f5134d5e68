//! SQLite implementation of the sync persistence ports.
//!
//! One store backs mappings, partner credentials, partner health and run
//! logs. Every call runs its SQL on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use stocksync_core::{MappingStore, PartnerCredentialStore, PartnerStateStore, SyncLogStore};
use stocksync_domain::{
    NewSyncLog, PartnerCredential, PartnerSyncStatus, ProductMapping, Result, StockSyncError,
    SyncLogUpdate,
};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::to_domain;

/// Partner row as written by the install flow.
#[derive(Clone)]
pub struct NewPartner {
    pub shop: String,
    pub access_token: Option<String>,
    pub is_active: bool,
}

/// Stored run log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncLogRow {
    pub id: String,
    pub partner_shop: String,
    pub sync_type: String,
    pub status: String,
    pub items_processed: i64,
    pub items_updated: i64,
    pub items_failed: i64,
    pub items_skipped: i64,
    pub error_message: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

/// Stored partner health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnerHealth {
    pub sync_status: Option<String>,
    pub consecutive_sync_failures: u32,
    pub last_sync_at: Option<String>,
}

pub struct SqliteSyncStore {
    db: Arc<DbManager>,
}

impl SqliteSyncStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Insert or replace a partner's credential, keeping its health state.
    pub async fn upsert_partner(&self, partner: NewPartner) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            conn.execute(
                "INSERT INTO partners (shop, access_token, is_active, is_deleted)
                 VALUES (?1, ?2, ?3, 0)
                 ON CONFLICT(shop) DO UPDATE SET
                     access_token = excluded.access_token,
                     is_active = excluded.is_active,
                     is_deleted = 0",
                params![partner.shop, partner.access_token, bool_to_int(partner.is_active)],
            )
            .map_err(to_domain)?;
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Soft-delete a partner; its mappings are left in place.
    pub async fn mark_partner_deleted(&self, shop: &str) -> Result<()> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute("UPDATE partners SET is_deleted = 1 WHERE shop = ?1", params![shop])
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(StockSyncError::NotFound(format!("partner {shop}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    /// Add an active mapping and return its row id.
    ///
    /// Re-adding an existing mapping reactivates it.
    pub async fn add_mapping(&self, mapping: &ProductMapping) -> Result<i64> {
        let db = Arc::clone(&self.db);
        let mapping = mapping.clone();
        task::spawn_blocking(move || -> Result<i64> {
            let conn = db.get_connection()?;
            conn.query_row(
                "INSERT INTO product_mappings
                     (partner_shop, partner_variant_id, my_variant_id, is_active, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)
                 ON CONFLICT(partner_shop, partner_variant_id, my_variant_id)
                     DO UPDATE SET is_active = 1
                 RETURNING id",
                params![
                    mapping.partner_shop,
                    mapping.partner_variant_id,
                    mapping.my_variant_id,
                    Utc::now().to_rfc3339()
                ],
                |row| row.get(0),
            )
            .map_err(to_domain)
        })
        .await
        .map_err(map_join_error)?
    }

    pub async fn deactivate_mapping(&self, id: i64) -> Result<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute("UPDATE product_mappings SET is_active = 0 WHERE id = ?1", params![id])
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(StockSyncError::NotFound(format!("product mapping {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    pub async fn partner_health(&self, shop: &str) -> Result<Option<PartnerHealth>> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<Option<PartnerHealth>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT sync_status, consecutive_sync_failures, last_sync_at
                 FROM partners WHERE shop = ?1",
                params![shop],
                |row| {
                    Ok(PartnerHealth {
                        sync_status: row.get(0)?,
                        consecutive_sync_failures: i64_to_u32(row.get(1)?),
                        last_sync_at: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(to_domain)
        })
        .await
        .map_err(map_join_error)?
    }

    /// Most recent log entries for a partner, newest first.
    pub async fn recent_logs(&self, shop: &str, limit: usize) -> Result<Vec<SyncLogRow>> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<Vec<SyncLogRow>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT id, partner_shop, sync_type, status, items_processed, items_updated,
                            items_failed, items_skipped, error_message, started_at, completed_at
                     FROM sync_logs
                     WHERE partner_shop = ?1
                     ORDER BY started_at DESC, id DESC
                     LIMIT ?2",
                )
                .map_err(to_domain)?;
            let rows = stmt
                .query_map(params![shop, usize_to_i64(limit)], map_log_row)
                .map_err(to_domain)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(to_domain)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl MappingStore for SqliteSyncStore {
    async fn get_active_mappings(
        &self,
        partner_filter: Option<&str>,
    ) -> Result<Vec<ProductMapping>> {
        let db = Arc::clone(&self.db);
        let filter = partner_filter.map(str::to_string);
        let mappings = task::spawn_blocking(move || -> Result<Vec<ProductMapping>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(
                    "SELECT partner_shop, partner_variant_id, my_variant_id
                     FROM product_mappings
                     WHERE is_active = 1 AND (?1 IS NULL OR partner_shop = ?1)
                     ORDER BY id",
                )
                .map_err(to_domain)?;
            let rows = stmt
                .query_map(params![filter], |row| {
                    Ok(ProductMapping {
                        partner_shop: row.get(0)?,
                        partner_variant_id: row.get(1)?,
                        my_variant_id: row.get(2)?,
                    })
                })
                .map_err(to_domain)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(to_domain)
        })
        .await
        .map_err(map_join_error)??;

        debug!(count = mappings.len(), "sync_store.mappings_loaded");
        Ok(mappings)
    }
}

#[async_trait]
impl PartnerCredentialStore for SqliteSyncStore {
    async fn get_credential(&self, shop: &str) -> Result<Option<PartnerCredential>> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<Option<PartnerCredential>> {
            let conn = db.get_connection()?;
            conn.query_row(
                "SELECT shop, access_token, is_active, is_deleted FROM partners WHERE shop = ?1",
                params![shop],
                |row| {
                    Ok(PartnerCredential {
                        shop: row.get(0)?,
                        access_token: row.get(1)?,
                        is_active: row.get::<_, i64>(2)? != 0,
                        is_deleted: row.get::<_, i64>(3)? != 0,
                    })
                },
            )
            .optional()
            .map_err(to_domain)
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl PartnerStateStore for SqliteSyncStore {
    async fn get_consecutive_failures(&self, shop: &str) -> Result<u32> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<u32> {
            let conn = db.get_connection()?;
            let count: Option<i64> = conn
                .query_row(
                    "SELECT consecutive_sync_failures FROM partners WHERE shop = ?1",
                    params![shop],
                    |row| row.get(0),
                )
                .optional()
                .map_err(to_domain)?;
            Ok(count.map_or(0, i64_to_u32))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_sync_status(
        &self,
        shop: &str,
        status: PartnerSyncStatus,
        consecutive_failures: u32,
    ) -> Result<()> {
        let db = Arc::clone(&self.db);
        let shop = shop.to_string();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE partners
                     SET sync_status = ?2, consecutive_sync_failures = ?3, last_sync_at = ?4
                     WHERE shop = ?1",
                    params![
                        shop,
                        status.as_str(),
                        i64::from(consecutive_failures),
                        Utc::now().to_rfc3339()
                    ],
                )
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(StockSyncError::NotFound(format!("partner {shop}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl SyncLogStore for SqliteSyncStore {
    async fn create_log(&self, log: &NewSyncLog) -> Result<String> {
        let db = Arc::clone(&self.db);
        let log = log.clone();
        task::spawn_blocking(move || -> Result<String> {
            let conn = db.get_connection()?;
            let id = Uuid::now_v7().to_string();
            conn.execute(
                "INSERT INTO sync_logs (id, partner_shop, sync_type, status, items_processed, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    log.partner_shop,
                    log.log_type.as_str(),
                    log.status.as_str(),
                    usize_to_i64(log.items_processed),
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(to_domain)?;
            Ok(id)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_log(&self, id: &str, update: &SyncLogUpdate) -> Result<()> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        let update = update.clone();
        task::spawn_blocking(move || -> Result<()> {
            let conn = db.get_connection()?;
            let changed = conn
                .execute(
                    "UPDATE sync_logs
                     SET status = ?2, items_processed = ?3, items_updated = ?4,
                         items_failed = ?5, items_skipped = ?6, error_message = ?7,
                         completed_at = ?8
                     WHERE id = ?1",
                    params![
                        id,
                        update.status.as_str(),
                        usize_to_i64(update.items_processed),
                        usize_to_i64(update.items_updated),
                        usize_to_i64(update.items_failed),
                        usize_to_i64(update.items_skipped),
                        update.error_message,
                        update.completed_at.to_rfc3339()
                    ],
                )
                .map_err(to_domain)?;
            if changed == 0 {
                return Err(StockSyncError::NotFound(format!("sync log {id}")));
            }
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }
}

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<SyncLogRow> {
    Ok(SyncLogRow {
        id: row.get(0)?,
        partner_shop: row.get(1)?,
        sync_type: row.get(2)?,
        status: row.get(3)?,
        items_processed: row.get(4)?,
        items_updated: row.get(5)?,
        items_failed: row.get(6)?,
        items_skipped: row.get(7)?,
        error_message: row.get(8)?,
        started_at: row.get(9)?,
        completed_at: row.get(10)?,
    })
}

fn map_join_error(err: task::JoinError) -> StockSyncError {
    if err.is_cancelled() {
        StockSyncError::Internal("sync store task cancelled".into())
    } else {
        StockSyncError::Internal(format!("sync store task panic: {err}"))
    }
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn usize_to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn i64_to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
