//! Sync one partner's mapped variants into the owner store.

use std::collections::HashSet;

use stocksync_domain::{
    PartnerSyncResult, ProductMapping, QuantityUpdate, StoreSession, SyncErrorType,
};
use tracing::{debug, info, instrument, warn};

use super::pipeline::BatchPipeline;

/// Runs fetch, resolve and write for a single partner.
pub struct PartnerSynchronizer {
    pipeline: BatchPipeline,
}

impl PartnerSynchronizer {
    pub fn new(pipeline: BatchPipeline) -> Self {
        Self { pipeline }
    }

    /// Copy partner quantities onto the mapped owner-store variants.
    ///
    /// `mappings` must all belong to `partner.shop`. Every mapping ends up
    /// counted exactly once as updated, failed or skipped, except when the
    /// partner credential is rejected and nothing could be read.
    #[instrument(
        skip(self, partner, owner, location_id, mappings),
        fields(partner = %partner.shop, mappings = mappings.len())
    )]
    pub async fn sync_partner(
        &self,
        partner: &StoreSession,
        owner: &StoreSession,
        location_id: &str,
        mappings: &[ProductMapping],
    ) -> PartnerSyncResult {
        let mut result = PartnerSyncResult::new(partner.shop.clone(), mappings.len());

        let partner_ids = unique(mappings.iter().map(|m| m.partner_variant_id.as_str()));
        let fetched = self.pipeline.fetch_partner_inventory(partner, &partner_ids).await;
        result.errors.extend(fetched.errors);
        result.error_type = fetched.error_type;

        if fetched.error_type == Some(SyncErrorType::AuthRevoked) && fetched.quantities.is_empty()
        {
            warn!("inventory_sync.partner.auth_revoked");
            result.success = false;
            return result;
        }

        let owner_ids = unique(mappings.iter().map(|m| m.my_variant_id.as_str()));
        let resolved = self.pipeline.resolve_inventory_items(owner, &owner_ids).await;
        result.errors.extend(resolved.errors);

        let mut updates = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            let Some(&quantity) = fetched.quantities.get(&mapping.partner_variant_id) else {
                result.items_skipped += 1;
                continue;
            };
            let Some(inventory_item_id) = resolved.inventory_items.get(&mapping.my_variant_id)
            else {
                result.items_skipped += 1;
                result.errors.push(format!(
                    "No inventory item found for variant {}",
                    mapping.my_variant_id
                ));
                continue;
            };
            updates.push(QuantityUpdate { inventory_item_id: inventory_item_id.clone(), quantity });
        }

        if updates.is_empty() {
            debug!(skipped = result.items_skipped, "inventory_sync.partner.nothing_to_write");
            return result;
        }

        let written = self.pipeline.write_quantities(owner, location_id, &updates).await;
        result.items_updated = written.updated;
        result.items_failed = written.failed;
        result.errors.extend(written.errors);
        if result.items_failed > 0 {
            result.success = false;
        }

        info!(
            updated = result.items_updated,
            failed = result.items_failed,
            skipped = result.items_skipped,
            "inventory_sync.partner.written"
        );
        result
    }
}

/// Distinct ids in first-seen order.
fn unique<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use stocksync_domain::{InventoryItemRef, SetQuantitiesResponse, VariantQuantity};

    use super::*;
    use crate::sync::pipeline::PipelineSettings;
    use crate::sync::ports::InventoryApi;
    use crate::sync::retry::{AttemptFailure, RetryPolicy};

    #[derive(Default)]
    struct FakeStores {
        partner_quantities: HashMap<String, i64>,
        owner_items: HashMap<String, String>,
        fetch_error: Option<AttemptFailure>,
        reject_writes: bool,
        resolve_calls: Mutex<u32>,
        writes: Mutex<Vec<QuantityUpdate>>,
    }

    #[async_trait]
    impl InventoryApi for FakeStores {
        async fn fetch_variant_quantities(
            &self,
            _session: &StoreSession,
            variant_ids: &[String],
        ) -> Result<Vec<VariantQuantity>, AttemptFailure> {
            if let Some(error) = &self.fetch_error {
                return Err(error.clone());
            }
            Ok(variant_ids
                .iter()
                .map(|id| VariantQuantity {
                    variant_id: id.clone(),
                    quantity: self.partner_quantities.get(id).copied(),
                })
                .collect())
        }

        async fn fetch_inventory_item_ids(
            &self,
            _session: &StoreSession,
            variant_ids: &[String],
        ) -> Result<Vec<InventoryItemRef>, AttemptFailure> {
            *self.resolve_calls.lock().unwrap() += 1;
            Ok(variant_ids
                .iter()
                .map(|id| InventoryItemRef {
                    variant_id: id.clone(),
                    inventory_item_id: self.owner_items.get(id).cloned(),
                })
                .collect())
        }

        async fn set_inventory_quantities(
            &self,
            _session: &StoreSession,
            _location_id: &str,
            updates: &[QuantityUpdate],
        ) -> Result<SetQuantitiesResponse, AttemptFailure> {
            if self.reject_writes {
                return Ok(SetQuantitiesResponse {
                    user_errors: vec!["Inventory item is not stocked at location".into()],
                });
            }
            self.writes.lock().unwrap().extend_from_slice(updates);
            Ok(SetQuantitiesResponse::default())
        }
    }

    fn synchronizer(api: Arc<FakeStores>) -> PartnerSynchronizer {
        PartnerSynchronizer::new(BatchPipeline::new(
            api,
            PipelineSettings {
                fetch_batch_size: 250,
                write_batch_size: 10,
                batch_delay: Duration::ZERO,
                retry: RetryPolicy::new(2, Vec::new()),
            },
        ))
    }

    fn mapping(partner: &str, mine: &str) -> ProductMapping {
        ProductMapping {
            partner_shop: "partner.myshopify.com".into(),
            partner_variant_id: partner.into(),
            my_variant_id: mine.into(),
        }
    }

    fn sessions() -> (StoreSession, StoreSession) {
        (
            StoreSession::new("partner.myshopify.com", "partner-token"),
            StoreSession::new("owner.myshopify.com", "owner-token"),
        )
    }

    #[tokio::test]
    async fn copies_quantities_for_resolved_variants() {
        let api = Arc::new(FakeStores {
            partner_quantities: HashMap::from([("p1".into(), 7), ("p2".into(), 0)]),
            owner_items: HashMap::from([("m1".into(), "i1".into()), ("m2".into(), "i2".into())]),
            ..FakeStores::default()
        });
        let (partner, owner) = sessions();

        let result = synchronizer(api.clone())
            .sync_partner(&partner, &owner, "loc", &[mapping("p1", "m1"), mapping("p2", "m2")])
            .await;

        assert!(result.success);
        assert_eq!(result.items_updated, 2);
        assert!(result.counts_balance());
        assert_eq!(
            *api.writes.lock().unwrap(),
            vec![
                QuantityUpdate { inventory_item_id: "i1".into(), quantity: 7 },
                QuantityUpdate { inventory_item_id: "i2".into(), quantity: 0 },
            ]
        );
    }

    #[tokio::test]
    async fn auth_revoked_with_nothing_fetched_stops_before_resolve() {
        let api = Arc::new(FakeStores {
            fetch_error: Some(AttemptFailure::with_status(401, "Unauthorized")),
            ..FakeStores::default()
        });
        let (partner, owner) = sessions();

        let result =
            synchronizer(api.clone()).sync_partner(&partner, &owner, "loc", &[mapping("p1", "m1")]).await;

        assert!(!result.success);
        assert_eq!(result.error_type, Some(SyncErrorType::AuthRevoked));
        assert_eq!((result.items_updated, result.items_failed, result.items_skipped), (0, 0, 0));
        assert_eq!(*api.resolve_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_quantity_or_item_is_skipped() {
        let api = Arc::new(FakeStores {
            partner_quantities: HashMap::from([("p1".into(), 3), ("p2".into(), 4)]),
            owner_items: HashMap::from([("m1".into(), "i1".into())]),
            ..FakeStores::default()
        });
        let (partner, owner) = sessions();
        let mappings = [mapping("p1", "m1"), mapping("p2", "m2"), mapping("p3", "m3")];

        let result = synchronizer(api).sync_partner(&partner, &owner, "loc", &mappings).await;

        assert!(result.success);
        assert_eq!(result.items_updated, 1);
        assert_eq!(result.items_skipped, 2);
        assert_eq!(result.errors, vec!["No inventory item found for variant m2".to_string()]);
        assert!(result.counts_balance());
    }

    #[tokio::test]
    async fn nothing_to_write_returns_without_mutation() {
        let api = Arc::new(FakeStores::default());
        let (partner, owner) = sessions();

        let result =
            synchronizer(api.clone()).sync_partner(&partner, &owner, "loc", &[mapping("p1", "m1")]).await;

        assert!(result.success);
        assert_eq!(result.items_skipped, 1);
        assert!(api.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_writes_fail_the_partner() {
        let api = Arc::new(FakeStores {
            partner_quantities: HashMap::from([("p1".into(), 3)]),
            owner_items: HashMap::from([("m1".into(), "i1".into())]),
            reject_writes: true,
            ..FakeStores::default()
        });
        let (partner, owner) = sessions();

        let result = synchronizer(api).sync_partner(&partner, &owner, "loc", &[mapping("p1", "m1")]).await;

        assert!(!result.success);
        assert_eq!(result.items_failed, 1);
        assert!(result.errors[0].contains("not stocked at location"));
    }

    #[test]
    fn unique_keeps_first_seen_order() {
        let ids = unique(["b", "a", "b", "c", "a"].into_iter());
        assert_eq!(ids, vec!["b", "a", "c"]);
    }
}
