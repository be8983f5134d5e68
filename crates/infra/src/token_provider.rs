//! Owner-store credential from static configuration.

use async_trait::async_trait;
use stocksync_core::TokenProvider;
use stocksync_domain::{OwnerConnection, OwnerStoreConfig, Result};

/// Serves the owner connection configured at startup.
///
/// A missing shop, token or location id yields a disconnected connection
/// naming the missing setting rather than an error.
pub struct StaticTokenProvider {
    connection: OwnerConnection,
}

impl StaticTokenProvider {
    pub fn new(config: &OwnerStoreConfig) -> Self {
        Self { connection: connection_from(config) }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_valid_credential(&self) -> Result<OwnerConnection> {
        Ok(self.connection.clone())
    }
}

fn connection_from(config: &OwnerStoreConfig) -> OwnerConnection {
    let shop = present(config.shop.as_deref());
    let token = present(config.access_token.as_deref());
    let location = present(config.location_id.as_deref());

    match (shop, token, location) {
        (Some(shop), Some(token), Some(location)) => {
            OwnerConnection::connected(shop, token, location)
        }
        (shop, token, _) => {
            let missing = if shop.is_none() {
                "owner store shop is not configured"
            } else if token.is_none() {
                "owner store access token is not configured"
            } else {
                "owner store location id is not configured"
            };
            OwnerConnection {
                shop: shop.map(str::to_string),
                ..OwnerConnection::disconnected(missing)
            }
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
