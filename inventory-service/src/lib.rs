//! Inventory Service
//!
//! This crate provides the credential-gated inventory tracker: a session
//! service and an inventory service, both calling stored procedures through
//! a [`db::CallGateway`].

pub mod cli;
pub mod config;
pub mod inventory;
pub mod models;
pub mod schema;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use cli::Menu;
pub use config::{ConfigError, InventoryConfig};
pub use inventory::InventoryService;
pub use models::{DeleteOutcome, ProductRecord};
pub use session::{Session, SessionService, NO_IDENTITY};
pub use store::InMemoryStore;
