//! # StockSync Domain
//!
//! Business domain types and models for StockSync.
//!
//! This crate contains:
//! - Product mappings, credentials and remote inventory shapes
//! - Sync result, status and critical-failure types
//! - Domain error types and Result definitions
//! - Configuration structures and domain constants
//!
//! ## Architecture
//! - No dependencies on other StockSync crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
