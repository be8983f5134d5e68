//! Port interfaces for sync operations

use async_trait::async_trait;
use stocksync_domain::{
    AlertMessage, InventoryItemRef, NewSyncLog, OwnerConnection, PartnerCredential,
    PartnerSyncStatus, ProductMapping, QuantityUpdate, Result, SetQuantitiesResponse,
    StoreSession, SyncLogUpdate, VariantQuantity,
};

use super::retry::AttemptFailure;

/// Remote commerce API, used against both partner and owner stores.
///
/// Failures carry the HTTP status (when one was received) and the raw
/// message so the engine can classify them. Returned ids echo the ids the
/// caller passed in, whatever normalisation the adapter applies on the wire.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Look up available quantities for a chunk of variants.
    async fn fetch_variant_quantities(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> std::result::Result<Vec<VariantQuantity>, AttemptFailure>;

    /// Look up the inventory item behind each variant.
    async fn fetch_inventory_item_ids(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> std::result::Result<Vec<InventoryItemRef>, AttemptFailure>;

    /// Set absolute quantities at a location, skipping compare-quantity
    /// validation.
    async fn set_inventory_quantities(
        &self,
        session: &StoreSession,
        location_id: &str,
        updates: &[QuantityUpdate],
    ) -> std::result::Result<SetQuantitiesResponse, AttemptFailure>;
}

/// Supplies a refreshed owner-store credential and its primary location.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn get_valid_credential(&self) -> Result<OwnerConnection>;
}

/// Read access to imported product mappings
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Active mappings, optionally restricted to one partner shop.
    async fn get_active_mappings(&self, partner_filter: Option<&str>)
        -> Result<Vec<ProductMapping>>;
}

/// Partner credential lookup
#[async_trait]
pub trait PartnerCredentialStore: Send + Sync {
    async fn get_credential(&self, shop: &str) -> Result<Option<PartnerCredential>>;
}

/// Cross-run partner health state
#[async_trait]
pub trait PartnerStateStore: Send + Sync {
    async fn get_consecutive_failures(&self, shop: &str) -> Result<u32>;

    async fn update_sync_status(
        &self,
        shop: &str,
        status: PartnerSyncStatus,
        consecutive_failures: u32,
    ) -> Result<()>;
}

/// Per-partner run log
#[async_trait]
pub trait SyncLogStore: Send + Sync {
    /// Create a log entry and return its id.
    async fn create_log(&self, log: &NewSyncLog) -> Result<String>;

    async fn update_log(&self, id: &str, update: &SyncLogUpdate) -> Result<()>;
}

/// Outbound alert delivery (email)
#[async_trait]
pub trait AlertTransport: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<()>;
}
