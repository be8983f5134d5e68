//! GraphQL client implementing the [`InventoryApi`] port.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use stocksync_core::{AttemptFailure, InventoryApi};
use stocksync_domain::constants::{
    ACCESS_TOKEN_HEADER, INVENTORY_ADJUST_REASON, INVENTORY_QUANTITY_NAME,
};
use stocksync_domain::{
    CommerceConfig, InventoryItemRef, QuantityUpdate, Result, SetQuantitiesResponse, StoreSession,
    VariantQuantity,
};
use tracing::{debug, instrument, warn};

use super::errors::CommerceError;
use super::ids::{inventory_item_gid, location_gid, variant_gid};
use super::queries::{
    GraphQlRequest, GraphQlResponse, NodeIdsVariables, QuantityInput, SetQuantitiesData,
    SetQuantitiesInput, SetQuantitiesVariables, VariantInventoryItemsData, VariantQuantitiesData,
    SET_QUANTITIES_MUTATION, VARIANT_INVENTORY_ITEMS_QUERY, VARIANT_QUANTITIES_QUERY,
};
use crate::http::HttpClient;

/// Admin API client shared by the partner and owner stores.
#[derive(Clone, Debug)]
pub struct CommerceClient {
    http: HttpClient,
    api_version: String,
    scheme: String,
}

impl CommerceClient {
    pub fn new(config: &CommerceConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_http(http, config))
    }

    pub fn with_http(http: HttpClient, config: &CommerceConfig) -> Self {
        Self { http, api_version: config.api_version.clone(), scheme: config.scheme.clone() }
    }

    pub fn endpoint(&self, shop: &str) -> String {
        format!("{}://{}/admin/api/{}/graphql.json", self.scheme, shop, self.api_version)
    }

    async fn execute<V, T>(
        &self,
        session: &StoreSession,
        query: &str,
        variables: V,
    ) -> std::result::Result<T, CommerceError>
    where
        V: Serialize + Send,
        T: DeserializeOwned,
    {
        let builder = self
            .http
            .request(Method::POST, self.endpoint(&session.shop))
            .header(ACCESS_TOKEN_HEADER, &session.access_token)
            .json(&GraphQlRequest { query, variables });

        let response = self.http.send(builder).await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if !(200..300).contains(&status) {
            return Err(CommerceError::http(status, &body));
        }

        let envelope: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|err| CommerceError::Decode(err.to_string()))?;

        if !envelope.errors.is_empty() {
            return Err(CommerceError::GraphQl {
                status,
                throttled: envelope.errors.iter().any(|e| e.is_throttled()),
                messages: envelope.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        envelope.data.ok_or_else(|| CommerceError::Decode("response has no data".into()))
    }
}

/// Request gids paired with the caller's original ids.
fn gid_lookup(
    ids: &[String],
    to_gid: fn(&str) -> String,
) -> (Vec<String>, HashMap<String, String>) {
    let mut gids = Vec::with_capacity(ids.len());
    let mut originals = HashMap::with_capacity(ids.len());
    for id in ids {
        let gid = to_gid(id);
        originals.entry(gid.clone()).or_insert_with(|| id.clone());
        gids.push(gid);
    }
    (gids, originals)
}

#[async_trait]
impl InventoryApi for CommerceClient {
    #[instrument(skip(self, session, variant_ids), fields(shop = %session.shop, count = variant_ids.len()))]
    async fn fetch_variant_quantities(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> std::result::Result<Vec<VariantQuantity>, AttemptFailure> {
        let (gids, originals) = gid_lookup(variant_ids, variant_gid);
        let data: VariantQuantitiesData = self
            .execute(session, VARIANT_QUANTITIES_QUERY, NodeIdsVariables { ids: gids })
            .await?;

        let variants: Vec<VariantQuantity> = data
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|node| {
                let gid = node.id?;
                let variant_id = originals.get(&gid).cloned().unwrap_or(gid);
                Some(VariantQuantity { variant_id, quantity: node.inventory_quantity })
            })
            .collect();

        debug!(returned = variants.len(), "commerce.variant_quantities.fetched");
        Ok(variants)
    }

    #[instrument(skip(self, session, variant_ids), fields(shop = %session.shop, count = variant_ids.len()))]
    async fn fetch_inventory_item_ids(
        &self,
        session: &StoreSession,
        variant_ids: &[String],
    ) -> std::result::Result<Vec<InventoryItemRef>, AttemptFailure> {
        let (gids, originals) = gid_lookup(variant_ids, variant_gid);
        let data: VariantInventoryItemsData = self
            .execute(session, VARIANT_INVENTORY_ITEMS_QUERY, NodeIdsVariables { ids: gids })
            .await?;

        let items: Vec<InventoryItemRef> = data
            .nodes
            .into_iter()
            .flatten()
            .filter_map(|node| {
                let gid = node.id?;
                let variant_id = originals.get(&gid).cloned().unwrap_or(gid);
                Some(InventoryItemRef {
                    variant_id,
                    inventory_item_id: node.inventory_item.map(|item| item.id),
                })
            })
            .collect();

        debug!(returned = items.len(), "commerce.inventory_items.fetched");
        Ok(items)
    }

    #[instrument(skip(self, session, updates), fields(shop = %session.shop, count = updates.len()))]
    async fn set_inventory_quantities(
        &self,
        session: &StoreSession,
        location_id: &str,
        updates: &[QuantityUpdate],
    ) -> std::result::Result<SetQuantitiesResponse, AttemptFailure> {
        let location_id = location_gid(location_id);
        let input = SetQuantitiesInput {
            name: INVENTORY_QUANTITY_NAME,
            reason: INVENTORY_ADJUST_REASON,
            ignore_compare_quantity: true,
            quantities: updates
                .iter()
                .map(|update| QuantityInput {
                    inventory_item_id: inventory_item_gid(&update.inventory_item_id),
                    location_id: location_id.clone(),
                    quantity: update.quantity,
                })
                .collect(),
        };

        let data: SetQuantitiesData = self
            .execute(session, SET_QUANTITIES_MUTATION, SetQuantitiesVariables { input })
            .await?;

        let payload = data.inventory_set_quantities.ok_or_else(|| {
            AttemptFailure::from(CommerceError::Decode("mutation returned no payload".into()))
        })?;
        let user_errors: Vec<String> = payload.user_errors.iter().map(|e| e.describe()).collect();
        if !user_errors.is_empty() {
            warn!(user_errors = user_errors.len(), "commerce.set_quantities.rejected");
        }
        Ok(SetQuantitiesResponse { user_errors })
    }
}
