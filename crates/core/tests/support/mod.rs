//! Shared test helpers for `stocksync-core` integration tests.
//!
//! In-memory implementations of every sync port, plus a [`Harness`] that
//! wires them into an [`InventorySyncService`] with zero batch delays.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stocksync_core::{
    AlertTransport, AttemptFailure, InventoryApi, InventorySyncService, MappingStore,
    PartnerCredentialStore, PartnerStateStore, SyncLogStore, SyncPorts, TokenProvider,
};
use stocksync_domain::{
    AlertMessage, InventoryItemRef, NewSyncLog, OwnerConnection, PartnerCredential,
    PartnerSyncStatus, ProductMapping, QuantityUpdate, Result as DomainResult,
    SetQuantitiesResponse, StockSyncError, StoreSession, SyncConfig, SyncLogUpdate,
    VariantQuantity,
};

pub const OWNER_SHOP: &str = "owner.myshopify.com";
pub const LOCATION_ID: &str = "gid://shopify/Location/1";

/// Commerce API fake keyed by shop domain.
///
/// Partner shops answer quantity reads from `quantities`; the owner shop
/// answers inventory item lookups from `inventory_items` and records writes.
#[derive(Default)]
pub struct ScriptedInventoryApi {
    quantities: Mutex<HashMap<String, HashMap<String, i64>>>,
    fetch_failures: Mutex<HashMap<String, AttemptFailure>>,
    inventory_items: Mutex<HashMap<String, String>>,
    write_failures: Mutex<Vec<(String, AttemptFailure)>>,
    fetch_calls: Mutex<Vec<String>>,
    writes: Mutex<Vec<(String, QuantityUpdate)>>,
}

impl ScriptedInventoryApi {
    pub fn with_quantity(self, shop: &str, variant_id: &str, quantity: i64) -> Self {
        self.quantities
            .lock()
            .unwrap()
            .entry(shop.to_string())
            .or_default()
            .insert(variant_id.to_string(), quantity);
        self
    }

    pub fn with_inventory_item(self, variant_id: &str, inventory_item_id: &str) -> Self {
        self.inventory_items
            .lock()
            .unwrap()
            .insert(variant_id.to_string(), inventory_item_id.to_string());
        self
    }

    /// Every fetch against `shop` fails with `failure`.
    pub fn failing_fetches(self, shop: &str, failure: AttemptFailure) -> Self {
        self.fetch_failures.lock().unwrap().insert(shop.to_string(), failure);
        self
    }

    /// Any write chunk containing `inventory_item_id` fails with `failure`.
    pub fn failing_write_for(self, inventory_item_id: &str, failure: AttemptFailure) -> Self {
        self.write_failures.lock().unwrap().push((inventory_item_id.to_string(), failure));
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(String, QuantityUpdate)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl InventoryApi for ScriptedInventoryApi {
    async fn fetch_variant_quantities(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> Result<Vec<VariantQuantity>, AttemptFailure> {
        self.fetch_calls.lock().unwrap().push(session.shop.clone());
        if let Some(failure) = self.fetch_failures.lock().unwrap().get(&session.shop) {
            return Err(failure.clone());
        }
        let quantities = self.quantities.lock().unwrap();
        let shop = quantities.get(&session.shop);
        Ok(variant_ids
            .iter()
            .map(|id| VariantQuantity {
                variant_id: id.clone(),
                quantity: shop.and_then(|q| q.get(id)).copied(),
            })
            .collect())
    }

    async fn fetch_inventory_item_ids(
        &self,
        _session: &StoreSession,
        variant_ids: &[String],
    ) -> Result<Vec<InventoryItemRef>, AttemptFailure> {
        let items = self.inventory_items.lock().unwrap();
        Ok(variant_ids
            .iter()
            .map(|id| InventoryItemRef {
                variant_id: id.clone(),
                inventory_item_id: items.get(id).cloned(),
            })
            .collect())
    }

    async fn set_inventory_quantities(
        &self,
        session: &StoreSession,
        _location_id: &str,
        updates: &[QuantityUpdate],
    ) -> Result<SetQuantitiesResponse, AttemptFailure> {
        let failure = self
            .write_failures
            .lock()
            .unwrap()
            .iter()
            .find(|(item, _)| updates.iter().any(|u| &u.inventory_item_id == item))
            .map(|(_, failure)| failure.clone());
        if let Some(failure) = failure {
            return Err(failure);
        }
        let mut writes = self.writes.lock().unwrap();
        writes.extend(updates.iter().map(|u| (session.shop.clone(), u.clone())));
        Ok(SetQuantitiesResponse::default())
    }
}

/// Returns a fixed owner connection, or an error.
pub struct FixedTokenProvider(pub DomainResult<OwnerConnection>);

#[async_trait]
impl TokenProvider for FixedTokenProvider {
    async fn get_valid_credential(&self) -> DomainResult<OwnerConnection> {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct InMemoryMappings {
    pub mappings: Vec<ProductMapping>,
    pub fail: bool,
}

#[async_trait]
impl MappingStore for InMemoryMappings {
    async fn get_active_mappings(
        &self,
        partner_filter: Option<&str>,
    ) -> DomainResult<Vec<ProductMapping>> {
        if self.fail {
            return Err(StockSyncError::Database("mapping table unavailable".into()));
        }
        Ok(self
            .mappings
            .iter()
            .filter(|m| partner_filter.is_none_or(|shop| m.partner_shop == shop))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryCredentials {
    pub credentials: HashMap<String, PartnerCredential>,
    pub failing_shops: Vec<String>,
}

#[async_trait]
impl PartnerCredentialStore for InMemoryCredentials {
    async fn get_credential(&self, shop: &str) -> DomainResult<Option<PartnerCredential>> {
        if self.failing_shops.iter().any(|s| s == shop) {
            return Err(StockSyncError::Database(format!("credential read failed for {shop}")));
        }
        Ok(self.credentials.get(shop).cloned())
    }
}

/// Partner status table: `shop -> (last status, consecutive failures)`.
#[derive(Default)]
pub struct InMemoryPartnerState {
    pub state: Mutex<HashMap<String, (Option<PartnerSyncStatus>, u32)>>,
    pub fail_writes: bool,
}

impl InMemoryPartnerState {
    pub fn seeded(shop: &str, consecutive_failures: u32) -> Self {
        let state = Self::default();
        state.state.lock().unwrap().insert(shop.to_string(), (None, consecutive_failures));
        state
    }

    pub fn get(&self, shop: &str) -> Option<(Option<PartnerSyncStatus>, u32)> {
        self.state.lock().unwrap().get(shop).copied()
    }
}

#[async_trait]
impl PartnerStateStore for InMemoryPartnerState {
    async fn get_consecutive_failures(&self, shop: &str) -> DomainResult<u32> {
        Ok(self.state.lock().unwrap().get(shop).map_or(0, |(_, count)| *count))
    }

    async fn update_sync_status(
        &self,
        shop: &str,
        status: PartnerSyncStatus,
        consecutive_failures: u32,
    ) -> DomainResult<()> {
        if self.fail_writes {
            return Err(StockSyncError::Database("partner table is read-only".into()));
        }
        self.state
            .lock()
            .unwrap()
            .insert(shop.to_string(), (Some(status), consecutive_failures));
        Ok(())
    }
}

/// Recorded log entry: the created row and its final update, if any.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub id: String,
    pub created: NewSyncLog,
    pub update: Option<SyncLogUpdate>,
}

#[derive(Default)]
pub struct RecordingSyncLogs {
    pub records: Mutex<Vec<LogRecord>>,
}

impl RecordingSyncLogs {
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncLogStore for RecordingSyncLogs {
    async fn create_log(&self, log: &NewSyncLog) -> DomainResult<String> {
        let mut records = self.records.lock().unwrap();
        let id = format!("log-{}", records.len() + 1);
        records.push(LogRecord { id: id.clone(), created: log.clone(), update: None });
        Ok(id)
    }

    async fn update_log(&self, id: &str, update: &SyncLogUpdate) -> DomainResult<()> {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.update = Some(update.clone());
                Ok(())
            }
            None => Err(StockSyncError::NotFound(format!("sync log {id}"))),
        }
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    pub sent: Mutex<Vec<AlertMessage>>,
    pub fail: bool,
}

impl RecordingAlerts {
    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn subjects(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.subject.clone()).collect()
    }
}

#[async_trait]
impl AlertTransport for RecordingAlerts {
    async fn send(&self, message: &AlertMessage) -> DomainResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail {
            return Err(StockSyncError::Network("alert endpoint returned 502".into()));
        }
        Ok(())
    }
}

pub fn mapping(partner_shop: &str, partner_variant: &str, my_variant: &str) -> ProductMapping {
    ProductMapping {
        partner_shop: partner_shop.to_string(),
        partner_variant_id: partner_variant.to_string(),
        my_variant_id: my_variant.to_string(),
    }
}

pub fn active_credential(shop: &str) -> PartnerCredential {
    PartnerCredential {
        shop: shop.to_string(),
        access_token: Some(format!("token-{shop}")),
        is_active: true,
        is_deleted: false,
    }
}

/// Fully wired service over in-memory ports.
pub struct Harness {
    pub api: Arc<ScriptedInventoryApi>,
    pub token_provider: Arc<FixedTokenProvider>,
    pub mappings: Arc<InMemoryMappings>,
    pub credentials: Arc<InMemoryCredentials>,
    pub partner_state: Arc<InMemoryPartnerState>,
    pub sync_logs: Arc<RecordingSyncLogs>,
    pub alerts: Arc<RecordingAlerts>,
}

impl Harness {
    /// Connected owner store, active credentials for every mapped partner.
    pub fn new(api: ScriptedInventoryApi, mappings: Vec<ProductMapping>) -> Self {
        let credentials = mappings
            .iter()
            .map(|m| (m.partner_shop.clone(), active_credential(&m.partner_shop)))
            .collect();
        Self {
            api: Arc::new(api),
            token_provider: Arc::new(FixedTokenProvider(Ok(OwnerConnection::connected(
                OWNER_SHOP,
                "owner-token",
                LOCATION_ID,
            )))),
            mappings: Arc::new(InMemoryMappings { mappings, fail: false }),
            credentials: Arc::new(InMemoryCredentials {
                credentials,
                failing_shops: Vec::new(),
            }),
            partner_state: Arc::new(InMemoryPartnerState::default()),
            sync_logs: Arc::new(RecordingSyncLogs::default()),
            alerts: Arc::new(RecordingAlerts::default()),
        }
    }

    pub fn with_owner(mut self, owner: DomainResult<OwnerConnection>) -> Self {
        self.token_provider = Arc::new(FixedTokenProvider(owner));
        self
    }

    pub fn with_credential(mut self, credential: PartnerCredential) -> Self {
        let mut credentials = InMemoryCredentials {
            credentials: self.credentials.credentials.clone(),
            failing_shops: self.credentials.failing_shops.clone(),
        };
        credentials.credentials.insert(credential.shop.clone(), credential);
        self.credentials = Arc::new(credentials);
        self
    }

    pub fn with_failing_credential_lookup(mut self, shop: &str) -> Self {
        let mut failing_shops = self.credentials.failing_shops.clone();
        failing_shops.push(shop.to_string());
        self.credentials = Arc::new(InMemoryCredentials {
            credentials: self.credentials.credentials.clone(),
            failing_shops,
        });
        self
    }

    pub fn with_failing_mappings(mut self) -> Self {
        self.mappings = Arc::new(InMemoryMappings { mappings: Vec::new(), fail: true });
        self
    }

    pub fn with_partner_state(mut self, state: InMemoryPartnerState) -> Self {
        self.partner_state = Arc::new(state);
        self
    }

    pub fn with_alerts(mut self, alerts: RecordingAlerts) -> Self {
        self.alerts = Arc::new(alerts);
        self
    }

    pub fn service(&self) -> InventorySyncService {
        let config = SyncConfig {
            batch_delay_ms: 0,
            retry_delays_ms: Vec::new(),
            ..SyncConfig::default()
        };
        let ports = SyncPorts {
            token_provider: self.token_provider.clone(),
            mappings: self.mappings.clone(),
            credentials: self.credentials.clone(),
            partner_state: self.partner_state.clone(),
            sync_logs: self.sync_logs.clone(),
            alerts: self.alerts.clone(),
        };
        InventorySyncService::new(self.api.clone(), ports, &config)
    }
}
