//! Inventory synchronization engine.
//!
//! Control flow runs top-down: [`service::InventorySyncService`] groups
//! mappings per partner, [`partner::PartnerSynchronizer`] drives the
//! [`pipeline::BatchPipeline`], which wraps remote reads in
//! [`retry::with_retry`], which classifies failures with
//! [`classifier::classify_error`]. Everything is sequential.

pub mod alerts;
pub mod classifier;
pub mod partner;
pub mod pipeline;
pub mod ports;
pub mod retry;
pub mod service;
pub mod status;
