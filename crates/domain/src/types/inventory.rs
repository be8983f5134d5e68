//! Typed shapes for the three remote inventory operations.

use serde::{Deserialize, Serialize};

/// Quantity lookup result for one partner variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantQuantity {
    pub variant_id: String,
    /// `None` when the partner does not track inventory for the variant.
    pub quantity: Option<i64>,
}

/// Inventory item lookup result for one destination variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItemRef {
    pub variant_id: String,
    pub inventory_item_id: Option<String>,
}

/// Absolute quantity to set for one inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub inventory_item_id: String,
    pub quantity: i64,
}

/// Response of one set-quantities mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetQuantitiesResponse {
    /// Validation errors reported by the mutation; non-empty means the batch
    /// was rejected.
    pub user_errors: Vec<String>,
}

impl SetQuantitiesResponse {
    pub fn is_accepted(&self) -> bool {
        self.user_errors.is_empty()
    }
}
