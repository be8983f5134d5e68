//! GraphQL documents with their typed variables and responses.

use serde::{Deserialize, Serialize};

pub const VARIANT_QUANTITIES_QUERY: &str = r"query VariantQuantities($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on ProductVariant {
      id
      inventoryQuantity
    }
  }
}";

pub const VARIANT_INVENTORY_ITEMS_QUERY: &str = r"query VariantInventoryItems($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on ProductVariant {
      id
      inventoryItem {
        id
      }
    }
  }
}";

pub const SET_QUANTITIES_MUTATION: &str = r"mutation SetInventoryQuantities($input: InventorySetQuantitiesInput!) {
  inventorySetQuantities(input: $input) {
    inventoryAdjustmentGroup {
      reason
    }
    userErrors {
      field
      message
    }
  }
}";

/// GraphQL request envelope.
#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

/// GraphQL response envelope; `data` may be absent when `errors` is set.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorExtensions {
    pub code: Option<String>,
}

impl GraphQlError {
    pub fn is_throttled(&self) -> bool {
        self.extensions.as_ref().and_then(|e| e.code.as_deref()) == Some("THROTTLED")
    }
}

#[derive(Debug, Serialize)]
pub struct NodeIdsVariables {
    pub ids: Vec<String>,
}

/* -------------------------------------------------------------------------- */
/* Quantity lookup */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct VariantQuantitiesData {
    #[serde(default)]
    pub nodes: Vec<Option<VariantQuantityNode>>,
}

/// Non-variant nodes deserialize with every field absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantQuantityNode {
    pub id: Option<String>,
    pub inventory_quantity: Option<i64>,
}

/* -------------------------------------------------------------------------- */
/* Inventory item lookup */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Deserialize)]
pub struct VariantInventoryItemsData {
    #[serde(default)]
    pub nodes: Vec<Option<VariantInventoryItemNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInventoryItemNode {
    pub id: Option<String>,
    pub inventory_item: Option<NodeId>,
}

#[derive(Debug, Deserialize)]
pub struct NodeId {
    pub id: String,
}

/* -------------------------------------------------------------------------- */
/* inventorySetQuantities */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Serialize)]
pub struct SetQuantitiesVariables {
    pub input: SetQuantitiesInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesInput {
    pub name: &'static str,
    pub reason: &'static str,
    pub ignore_compare_quantity: bool,
    pub quantities: Vec<QuantityInput>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityInput {
    pub inventory_item_id: String,
    pub location_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesData {
    pub inventory_set_quantities: Option<SetQuantitiesPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetQuantitiesPayload {
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl UserError {
    /// `message (field.path)` when the field is known.
    pub fn describe(&self) -> String {
        match self.field.as_deref() {
            Some(field) if !field.is_empty() => format!("{} ({})", self.message, field.join(".")),
            _ => self.message.clone(),
        }
    }
}
