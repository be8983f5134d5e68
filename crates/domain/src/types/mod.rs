//! Domain types and models

pub mod alert;
pub mod inventory;
pub mod store;
pub mod sync;

pub use alert::*;
pub use inventory::*;
pub use store::*;
pub use sync::*;
