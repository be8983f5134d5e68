//! Inventory sync run orchestration.
//!
//! One run walks every partner that has active mappings, strictly in
//! sequence. Collaborator faults for one partner are logged and isolated so
//! the next partner still runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use stocksync_domain::{
    CriticalSyncError, InventorySyncResult, NewSyncLog, PartnerSyncResult, ProductMapping, Result,
    StoreSession, SyncConfig, SyncLogStatus, SyncLogType, SyncLogUpdate,
};
use tracing::{debug, error, info, instrument, warn};

use super::alerts::render_alert;
use super::partner::PartnerSynchronizer;
use super::pipeline::{BatchPipeline, PipelineSettings};
use super::ports::{
    AlertTransport, InventoryApi, MappingStore, PartnerCredentialStore, PartnerStateStore,
    SyncLogStore, TokenProvider,
};
use super::status::{owner_store_disconnected, FailurePolicy};

/// Collaborators a run needs besides the commerce API.
#[derive(Clone)]
pub struct SyncPorts {
    pub token_provider: Arc<dyn TokenProvider>,
    pub mappings: Arc<dyn MappingStore>,
    pub credentials: Arc<dyn PartnerCredentialStore>,
    pub partner_state: Arc<dyn PartnerStateStore>,
    pub sync_logs: Arc<dyn SyncLogStore>,
    pub alerts: Arc<dyn AlertTransport>,
}

/// Inventory sync entry point.
pub struct InventorySyncService {
    synchronizer: PartnerSynchronizer,
    ports: SyncPorts,
    policy: FailurePolicy,
    log_error_limit: usize,
}

impl InventorySyncService {
    pub fn new(api: Arc<dyn InventoryApi>, ports: SyncPorts, config: &SyncConfig) -> Self {
        let pipeline = BatchPipeline::new(api, PipelineSettings::from_config(config));
        Self {
            synchronizer: PartnerSynchronizer::new(pipeline),
            ports,
            policy: FailurePolicy::from_config(config),
            log_error_limit: config.log_error_limit,
        }
    }

    /// Sync every partner with active mappings, or only `partner_filter`.
    ///
    /// Returns `Err` only when mappings cannot be loaded. A disconnected
    /// owner store yields a failed aggregate with no partner processed.
    #[instrument(skip(self), fields(partner_filter = ?partner_filter))]
    pub async fn run(&self, partner_filter: Option<&str>) -> Result<InventorySyncResult> {
        info!("inventory_sync.run.started");

        let connection = match self.ports.token_provider.get_valid_credential().await {
            Ok(connection) => connection,
            Err(err) => {
                let reason = format!("Owner store credential unavailable: {err}");
                error!(error = %err, "inventory_sync.run.owner_credential_failed");
                self.send_alert(&owner_store_disconnected(None, &reason)).await;
                return Ok(InventorySyncResult::aborted(reason));
            }
        };

        let (owner, location_id) = match connection.usable() {
            Ok(usable) => usable,
            Err(reason) => {
                error!(status = %connection.status, reason = %reason, "inventory_sync.run.owner_disconnected");
                self.send_alert(&owner_store_disconnected(connection.shop.as_deref(), &reason))
                    .await;
                return Ok(InventorySyncResult::aborted(reason));
            }
        };

        let mappings = self.ports.mappings.get_active_mappings(partner_filter).await?;
        if mappings.is_empty() {
            info!("inventory_sync.run.no_mappings");
            return Ok(InventorySyncResult::empty());
        }

        let mut total = InventorySyncResult::empty();
        for (partner_shop, partner_mappings) in group_by_partner(mappings) {
            self.sync_one(&mut total, &partner_shop, &partner_mappings, &owner, &location_id).await;
        }

        info!(
            success = total.success,
            partners = total.partners_processed,
            processed = total.items_processed,
            updated = total.items_updated,
            failed = total.items_failed,
            skipped = total.items_skipped,
            "inventory_sync.run.completed"
        );
        Ok(total)
    }

    async fn sync_one(
        &self,
        total: &mut InventorySyncResult,
        partner_shop: &str,
        mappings: &[ProductMapping],
        owner: &StoreSession,
        location_id: &str,
    ) {
        let session = match self.ports.credentials.get_credential(partner_shop).await {
            Ok(Some(credential)) => match credential.session() {
                Some(session) => session,
                None => {
                    info!(partner = partner_shop, "inventory_sync.partner.skipped_inactive");
                    return;
                }
            },
            Ok(None) => {
                info!(partner = partner_shop, "inventory_sync.partner.skipped_missing_credential");
                return;
            }
            Err(err) => {
                error!(partner = partner_shop, error = %err, "inventory_sync.partner.credential_failed");
                total.record_error(format!("{partner_shop}: credential lookup failed: {err}"));
                return;
            }
        };

        let previous_failures =
            self.ports.partner_state.get_consecutive_failures(partner_shop).await.unwrap_or_else(
                |err| {
                    warn!(partner = partner_shop, error = %err, "inventory_sync.partner.state_read_failed");
                    0
                },
            );

        let log_id = self.start_log(partner_shop, mappings.len()).await;

        let result = self.synchronizer.sync_partner(&session, owner, location_id, mappings).await;

        let status = self.policy.status_for(&result);
        let consecutive_failures =
            self.policy.next_consecutive_failures(previous_failures, result.success);
        if let Err(err) = self
            .ports
            .partner_state
            .update_sync_status(partner_shop, status, consecutive_failures)
            .await
        {
            warn!(partner = partner_shop, error = %err, "inventory_sync.partner.state_write_failed");
        }

        if let Some(critical) = self.policy.detect_critical_failure(&result, consecutive_failures) {
            warn!(
                partner = partner_shop,
                kind = %critical.kind,
                "inventory_sync.partner.critical_failure"
            );
            self.send_alert(&critical).await;
        }

        if let Some(log_id) = log_id {
            self.finish_log(&log_id, &result).await;
        }

        info!(
            partner = partner_shop,
            status = %status,
            consecutive_failures,
            updated = result.items_updated,
            failed = result.items_failed,
            skipped = result.items_skipped,
            "inventory_sync.partner.completed"
        );
        total.absorb(result);
    }

    async fn start_log(&self, partner_shop: &str, items: usize) -> Option<String> {
        let entry = NewSyncLog {
            partner_shop: partner_shop.to_string(),
            log_type: SyncLogType::Inventory,
            status: SyncLogStatus::Started,
            items_processed: items,
        };
        match self.ports.sync_logs.create_log(&entry).await {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(partner = partner_shop, error = %err, "inventory_sync.log.create_failed");
                None
            }
        }
    }

    async fn finish_log(&self, log_id: &str, result: &PartnerSyncResult) {
        let error_message = (!result.errors.is_empty()).then(|| {
            result.errors.iter().take(self.log_error_limit).cloned().collect::<Vec<_>>().join("; ")
        });
        let update = SyncLogUpdate {
            status: if result.success { SyncLogStatus::Completed } else { SyncLogStatus::Failed },
            items_processed: result.items_processed,
            items_updated: result.items_updated,
            items_failed: result.items_failed,
            items_skipped: result.items_skipped,
            error_message,
            completed_at: Utc::now(),
        };
        if let Err(err) = self.ports.sync_logs.update_log(log_id, &update).await {
            warn!(log_id, error = %err, "inventory_sync.log.update_failed");
        }
    }

    async fn send_alert(&self, critical: &CriticalSyncError) {
        let message = render_alert(critical);
        match self.ports.alerts.send(&message).await {
            Ok(()) => debug!(kind = %critical.kind, "inventory_sync.alert.sent"),
            Err(err) => warn!(kind = %critical.kind, error = %err, "inventory_sync.alert.failed"),
        }
    }
}

/// Group mappings by partner shop in first-seen order, keeping mapping order.
fn group_by_partner(mappings: Vec<ProductMapping>) -> Vec<(String, Vec<ProductMapping>)> {
    let mut groups: Vec<(String, Vec<ProductMapping>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for mapping in mappings {
        match index.get(&mapping.partner_shop) {
            Some(&position) => groups[position].1.push(mapping),
            None => {
                index.insert(mapping.partner_shop.clone(), groups.len());
                groups.push((mapping.partner_shop.clone(), vec![mapping]));
            }
        }
    }
    groups
}
