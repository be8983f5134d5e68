//! Commerce store Admin API adapter.
//!
//! GraphQL over HTTP against `{scheme}://{shop}/admin/api/{version}/graphql.json`.
//! One [`CommerceClient`] serves every store; the session passed to each call
//! picks the shop and access token.

mod client;
mod errors;
mod ids;
mod queries;

pub use client::CommerceClient;
pub use errors::CommerceError;
pub use ids::{inventory_item_gid, location_gid, variant_gid};
