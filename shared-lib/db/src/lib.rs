//! Stored-procedure call gateway for the inventory tracker.
//!
//! Every call opens its own MySQL connection, invokes exactly one named
//! procedure with bound parameters and releases the connection before
//! returning. Backend failures are normalized into [`GatewayError`].

mod config;
mod gateway;
mod mysql;
mod value;

pub use config::DbConfig;
pub use gateway::{call_statement, validate_procedure_name, CallGateway};
pub use mysql::MySqlGateway;
pub use value::{Param, Row, SqlValue};

pub use error::GatewayError;

// Re-export value types used in rows and parameters
pub use chrono::NaiveDateTime;
pub use rust_decimal::Decimal;
