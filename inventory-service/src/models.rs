//! Inventory models
//!
//! Domain models decoded from stored-procedure result rows.

use chrono::NaiveDateTime;
use db::{GatewayError, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::schema::columns;

/// A stock record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub quantity: i64,
    pub price: Decimal,
    pub created_at: NaiveDateTime,
}

impl ProductRecord {
    /// Decode a product row (`ProductId, ProductName, Quantity, Price, CreatedAt`)
    pub fn from_row(row: &Row) -> Result<Self, GatewayError> {
        Ok(Self {
            id: row.get_i64(columns::PRODUCT_ID)?,
            name: row.get_str(columns::PRODUCT_NAME)?.to_string(),
            quantity: row.get_i64(columns::QUANTITY)?,
            price: row.get_decimal(columns::PRICE)?,
            created_at: row.get_timestamp(columns::CREATED_AT)?,
        })
    }
}

/// Result of a delete-by-name call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Rows were removed
    Deleted(u64),
    /// No product carried the name
    NotFound,
}

impl DeleteOutcome {
    pub fn from_affected(rows: u64) -> Self {
        if rows == 0 {
            Self::NotFound
        } else {
            Self::Deleted(rows)
        }
    }
}
