//! # StockSync App
//!
//! Command-line layer - argument parsing, wiring and the run summary.
//!
//! This crate contains:
//! - The `stocksync` CLI definition
//! - Application context (dependency injection)
//! - Run summary rendering and exit codes
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture for one sync run

pub mod cli;
pub mod context;
pub mod summary;

// Re-export for convenience
pub use cli::Cli;
pub use context::AppContext;
pub use summary::{exit_code, render_json, render_text, EXIT_FAILED, EXIT_FAULT, EXIT_SUCCESS};
