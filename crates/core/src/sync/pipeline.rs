//! Batched fetch / resolve / write operations.
//!
//! Each operation chunks its id list and walks the chunks sequentially,
//! pausing between chunks to stay under the remote rate limit. Reads go
//! through the retry executor; writes do not, and a failed write chunk never
//! blocks the next one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use stocksync_domain::{QuantityUpdate, StoreSession, SyncConfig, SyncErrorType};
use tracing::{debug, instrument, warn};

use super::ports::InventoryApi;
use super::retry::{with_retry, RetryPolicy};

/// Chunk sizes, inter-chunk delay and retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub fetch_batch_size: usize,
    pub write_batch_size: usize,
    pub batch_delay: Duration,
    pub retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            fetch_batch_size: config.fetch_batch_size.max(1),
            write_batch_size: config.write_batch_size.max(1),
            batch_delay: config.batch_delay(),
            retry: RetryPolicy::from_config(config),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

/// Partner quantities gathered across all fetch chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Variant id to available quantity; untracked variants are absent.
    pub quantities: HashMap<String, i64>,
    pub errors: Vec<String>,
    /// Classification of the last failed chunk.
    pub error_type: Option<SyncErrorType>,
}

/// Destination inventory item ids gathered across all resolve chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveOutcome {
    /// Destination variant id to inventory item id.
    pub inventory_items: HashMap<String, String>,
    pub errors: Vec<String>,
}

/// Per-item tally of the write step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub updated: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

/// The three batched remote operations of a partner sync.
pub struct BatchPipeline {
    api: Arc<dyn InventoryApi>,
    settings: PipelineSettings,
}

impl BatchPipeline {
    pub fn new(api: Arc<dyn InventoryApi>, settings: PipelineSettings) -> Self {
        Self { api, settings }
    }

    /// Fetch partner quantities in chunks of `fetch_batch_size` variants.
    ///
    /// Every failed chunk contributes its error; the classification of the
    /// last failed chunk is kept so the caller can decide whether to abort.
    /// An `auth_revoked` chunk stops the loop unless some quantities were
    /// already gathered.
    #[instrument(skip(self, session, variant_ids), fields(shop = %session.shop, variants = variant_ids.len()))]
    pub async fn fetch_partner_inventory(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> FetchOutcome {
        let api = self.api.as_ref();
        let mut outcome = FetchOutcome::default();
        let chunks: Vec<&[String]> = variant_ids.chunks(self.settings.fetch_batch_size).collect();
        let total = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.pause_between_chunks(index, total).await;

            let result =
                with_retry(&self.settings.retry, move || api.fetch_variant_quantities(session, chunk))
                    .await;

            match result.result {
                Ok(variants) => {
                    for variant in variants {
                        if let Some(quantity) = variant.quantity {
                            outcome.quantities.insert(variant.variant_id, quantity);
                        }
                    }
                }
                Err(failure) => {
                    warn!(
                        batch = index + 1,
                        total,
                        error_type = %failure.error_type,
                        retries = result.retry_count,
                        "inventory_sync.fetch_batch_failed"
                    );
                    outcome.errors.push(format!(
                        "Fetch batch {}/{} failed ({}): {}",
                        index + 1,
                        total,
                        failure.error_type,
                        failure.error
                    ));
                    outcome.error_type = Some(failure.error_type);
                    if failure.error_type == SyncErrorType::AuthRevoked
                        && outcome.quantities.is_empty()
                    {
                        warn!(skipped_batches = total - index - 1, "inventory_sync.fetch_aborted");
                        break;
                    }
                }
            }
        }

        debug!(found = outcome.quantities.len(), "inventory_sync.fetch_complete");
        outcome
    }

    /// Resolve destination inventory item ids for destination variants.
    ///
    /// Failures are reported but never classified: an unresolvable variant
    /// is treated as a data problem, not an outage.
    #[instrument(skip(self, session, variant_ids), fields(shop = %session.shop, variants = variant_ids.len()))]
    pub async fn resolve_inventory_items(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> ResolveOutcome {
        let api = self.api.as_ref();
        let mut outcome = ResolveOutcome::default();
        let chunks: Vec<&[String]> = variant_ids.chunks(self.settings.fetch_batch_size).collect();
        let total = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.pause_between_chunks(index, total).await;

            let result =
                with_retry(&self.settings.retry, move || api.fetch_inventory_item_ids(session, chunk))
                    .await;

            match result.result {
                Ok(items) => {
                    for item in items {
                        if let Some(inventory_item_id) = item.inventory_item_id {
                            outcome.inventory_items.insert(item.variant_id, inventory_item_id);
                        }
                    }
                }
                Err(failure) => {
                    warn!(
                        batch = index + 1,
                        total,
                        error_type = %failure.error_type,
                        "inventory_sync.resolve_batch_failed"
                    );
                    outcome.errors.push(format!(
                        "Resolve batch {}/{} failed: {}",
                        index + 1,
                        total,
                        failure.error
                    ));
                }
            }
        }

        debug!(resolved = outcome.inventory_items.len(), "inventory_sync.resolve_complete");
        outcome
    }

    /// Write absolute quantities, `write_batch_size` items per mutation.
    ///
    /// A rejected or failed chunk counts all of its items as failed and the
    /// loop moves on.
    #[instrument(skip(self, session, updates), fields(shop = %session.shop, updates = updates.len()))]
    pub async fn write_quantities(
        &self,
        session: &StoreSession,
        location_id: &str,
        updates: &[QuantityUpdate],
    ) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();
        let chunks: Vec<&[QuantityUpdate]> =
            updates.chunks(self.settings.write_batch_size).collect();
        let total = chunks.len();

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.pause_between_chunks(index, total).await;

            match self.api.set_inventory_quantities(session, location_id, chunk).await {
                Ok(response) if response.is_accepted() => {
                    outcome.updated += chunk.len();
                }
                Ok(response) => {
                    warn!(
                        batch = index + 1,
                        total,
                        user_errors = response.user_errors.len(),
                        "inventory_sync.write_batch_rejected"
                    );
                    outcome.failed += chunk.len();
                    outcome.errors.push(format!(
                        "Write batch {}/{} rejected: {}",
                        index + 1,
                        total,
                        response.user_errors.join("; ")
                    ));
                }
                Err(failure) => {
                    warn!(
                        batch = index + 1,
                        total,
                        http_status = ?failure.http_status,
                        "inventory_sync.write_batch_failed"
                    );
                    outcome.failed += chunk.len();
                    outcome.errors.push(format!(
                        "Write batch {}/{} failed: {}",
                        index + 1,
                        total,
                        failure
                    ));
                }
            }
        }

        debug!(updated = outcome.updated, failed = outcome.failed, "inventory_sync.write_complete");
        outcome
    }

    async fn pause_between_chunks(&self, index: usize, total: usize) {
        if index > 0 && total > 1 && !self.settings.batch_delay.is_zero() {
            tokio::time::sleep(self.settings.batch_delay).await;
        }
    }
}
