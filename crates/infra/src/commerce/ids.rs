//! Global id normalisation.
//!
//! Mappings may store bare numeric ids; the API only accepts
//! `gid://shopify/{Type}/{id}`.

const GID_PREFIX: &str = "gid://";

fn to_gid(kind: &str, id: &str) -> String {
    let id = id.trim();
    if id.starts_with(GID_PREFIX) {
        id.to_string()
    } else {
        format!("gid://shopify/{kind}/{id}")
    }
}

pub fn variant_gid(id: &str) -> String {
    to_gid("ProductVariant", id)
}

pub fn inventory_item_gid(id: &str) -> String {
    to_gid("InventoryItem", id)
}

pub fn location_gid(id: &str) -> String {
    to_gid("Location", id)
}
