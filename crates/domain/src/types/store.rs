//! Store credentials and product mappings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Link between a partner variant and a variant in the operator's store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductMapping {
    pub partner_shop: String,
    pub partner_variant_id: String,
    pub my_variant_id: String,
}

/// Authenticated handle on one remote store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreSession {
    pub shop: String,
    pub access_token: String,
}

impl StoreSession {
    pub fn new(shop: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self { shop: shop.into(), access_token: access_token.into() }
    }
}

impl fmt::Debug for StoreSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSession")
            .field("shop", &self.shop)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Stored credential for a partner store.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerCredential {
    pub shop: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
}

impl PartnerCredential {
    /// Session for an active, non-deleted partner with a non-empty token.
    pub fn session(&self) -> Option<StoreSession> {
        if !self.is_active || self.is_deleted {
            return None;
        }
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .map(|token| StoreSession::new(self.shop.clone(), token))
    }
}

impl fmt::Debug for PartnerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerCredential")
            .field("shop", &self.shop)
            .field("has_token", &self.access_token.is_some())
            .field("is_active", &self.is_active)
            .field("is_deleted", &self.is_deleted)
            .finish()
    }
}

/// Connection state reported by the owner-store token provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Expired,
    Error,
}

impl_domain_status_conversions!(ConnectionStatus {
    Connected => "connected",
    Disconnected => "disconnected",
    Expired => "expired",
    Error => "error",
});

/// Owner-store credential as returned by the token provider.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnerConnection {
    pub status: ConnectionStatus,
    pub shop: Option<String>,
    pub access_token: Option<String>,
    pub location_id: Option<String>,
    pub error: Option<String>,
}

impl OwnerConnection {
    pub fn connected(
        shop: impl Into<String>,
        access_token: impl Into<String>,
        location_id: impl Into<String>,
    ) -> Self {
        Self {
            status: ConnectionStatus::Connected,
            shop: Some(shop.into()),
            access_token: Some(access_token.into()),
            location_id: Some(location_id.into()),
            error: None,
        }
    }

    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            shop: None,
            access_token: None,
            location_id: None,
            error: Some(reason.into()),
        }
    }

    /// Session plus location id, or the reason the owner store is unusable.
    pub fn usable(&self) -> Result<(StoreSession, String), String> {
        if self.status != ConnectionStatus::Connected {
            return Err(self
                .error
                .clone()
                .unwrap_or_else(|| format!("owner store status is {}", self.status)));
        }
        let shop = non_empty(self.shop.as_deref()).ok_or("owner store shop is missing")?;
        let token =
            non_empty(self.access_token.as_deref()).ok_or("owner store access token is missing")?;
        let location =
            non_empty(self.location_id.as_deref()).ok_or("owner store location id is missing")?;
        Ok((StoreSession::new(shop, token), location.to_string()))
    }
}

impl fmt::Debug for OwnerConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnerConnection")
            .field("status", &self.status)
            .field("shop", &self.shop)
            .field("has_token", &self.access_token.is_some())
            .field("location_id", &self.location_id)
            .field("error", &self.error)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
