//! Inventory service
//!
//! Add, list, find and delete operations over product records. Persistence
//! is delegated to the call gateway; this layer owns the not-found policy
//! and the log trail.

use db::CallGateway;
use error::{AppError, Result};
use rust_decimal::Decimal;

use crate::models::{DeleteOutcome, ProductRecord};
use crate::schema::{self, AddProduct, DeleteProduct, DisplayAllProducts, FindProduct};

/// Largest quantity the `INT` quantity column holds.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;

/// Inventory service for business operations
pub struct InventoryService<G> {
    gateway: G,
}

impl<G: CallGateway> InventoryService<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    /// Add stock. The store accumulates quantity when the name already exists.
    ///
    /// Returns the affected-row count reported by the store.
    pub async fn add_product(&self, name: &str, quantity: i64, price: Decimal) -> Result<u64> {
        validate_name(name)?;
        if quantity < 0 {
            return Err(AppError::Validation(format!(
                "quantity must not be negative, got {}",
                quantity
            )));
        }
        if quantity > MAX_QUANTITY {
            return Err(AppError::Validation(format!(
                "quantity must not exceed {}, got {}",
                MAX_QUANTITY, quantity
            )));
        }
        if price.is_sign_negative() {
            return Err(AppError::Validation(format!(
                "price must not be negative, got {}",
                price
            )));
        }

        let call = AddProduct {
            name,
            quantity,
            price,
        };
        let affected = schema::effect(&self.gateway, &call).await?;

        tracing::info!("Added {} units of '{}' to inventory.", quantity, name);
        Ok(affected)
    }

    /// All products, in the order the store returns them.
    pub async fn list_products(&self) -> Result<Vec<ProductRecord>> {
        let rows = schema::query(&self.gateway, &DisplayAllProducts).await?;

        if rows.is_empty() {
            tracing::info!("Inventory is empty.");
            return Ok(Vec::new());
        }

        let products = rows
            .iter()
            .map(ProductRecord::from_row)
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::info!("Listed {} product(s) in the inventory.", products.len());
        Ok(products)
    }

    /// First product carrying `name`, or `None` when there is none.
    pub async fn find_product(&self, name: &str) -> Result<Option<ProductRecord>> {
        validate_name(name)?;

        let rows = schema::query(&self.gateway, &FindProduct { name }).await?;
        let Some(row) = rows.first() else {
            tracing::error!("Product '{}' not found in inventory.", name);
            return Ok(None);
        };

        let product = ProductRecord::from_row(row)?;
        tracing::info!("Found product '{}' in inventory.", name);
        Ok(Some(product))
    }

    /// Delete every product carrying `name`.
    pub async fn delete_product(&self, name: &str) -> Result<DeleteOutcome> {
        validate_name(name)?;

        let affected = schema::effect(&self.gateway, &DeleteProduct { name }).await?;
        let outcome = DeleteOutcome::from_affected(affected);

        match outcome {
            DeleteOutcome::NotFound => {
                tracing::error!("Failed to delete product '{}' - not found.", name)
            }
            DeleteOutcome::Deleted(_) => {
                tracing::info!("Deleted product '{}' from inventory.", name)
            }
        }
        Ok(outcome)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Product name cannot be empty.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::Arc;

    use db::GatewayError;
    use tracing::Level;

    use crate::store::InMemoryStore;
    use crate::test_support::capture_logs;

    fn service() -> (InventoryService<Arc<InMemoryStore>>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (InventoryService::new(store.clone()), store)
    }

    fn price(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[tokio::test]
    async fn test_add_then_find() {
        let (service, _) = service();

        assert_eq!(service.add_product("Widget", 10, price("2.50")).await.unwrap(), 1);

        let found = service.find_product("Widget").await.unwrap().unwrap();
        assert_eq!(found.name, "Widget");
        assert_eq!(found.quantity, 10);
        assert_eq!(found.price, price("2.50"));
    }

    #[tokio::test]
    async fn test_re_add_accumulates() {
        let (service, _) = service();

        service.add_product("Widget", 10, price("2.50")).await.unwrap();
        service.add_product("Widget", 7, price("2.50")).await.unwrap();

        let found = service.find_product("Widget").await.unwrap().unwrap();
        assert_eq!(found.quantity, 17);
        assert_eq!(service.list_products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_re_add_past_column_range_fails_cleanly() {
        let (service, store) = service();
        service.add_product("Widget", MAX_QUANTITY, price("1.00")).await.unwrap();

        let err = service.add_product("Widget", 1, price("1.00")).await.unwrap_err();

        assert!(err.is_store_failure());
        assert_eq!(store.products()[0].quantity, MAX_QUANTITY);
    }

    #[tokio::test]
    async fn test_add_logs_quantity_and_name() {
        let (service, _) = service();
        let (logs, _guard) = capture_logs();

        service.add_product("Widget", 10, price("2.50")).await.unwrap();

        assert_eq!(
            logs.messages(Level::INFO),
            ["Added 10 units of 'Widget' to inventory."]
        );
    }

    #[tokio::test]
    async fn test_list_empty_logs_once() {
        let (service, _) = service();
        let (logs, _guard) = capture_logs();

        let products = service.list_products().await.unwrap();

        assert!(products.is_empty());
        assert_eq!(logs.messages(Level::INFO), ["Inventory is empty."]);
        assert_eq!(logs.count(Level::ERROR), 0);
    }

    #[tokio::test]
    async fn test_list_keeps_store_order() {
        let (service, _) = service();
        for name in ["Widget", "Gadget", "Anvil"] {
            service.add_product(name, 1, price("1.00")).await.unwrap();
        }

        let names: Vec<_> = service
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Widget", "Gadget", "Anvil"]);
    }

    #[tokio::test]
    async fn test_find_missing_logs_error_once() {
        let (service, _) = service();
        let (logs, _guard) = capture_logs();

        assert!(service.find_product("Ghost").await.unwrap().is_none());
        assert_eq!(logs.count(Level::ERROR), 1);
        assert_eq!(
            logs.messages(Level::ERROR),
            ["Product 'Ghost' not found in inventory."]
        );
    }

    #[tokio::test]
    async fn test_delete_missing_logs_error_once() {
        let (service, _) = service();
        let (logs, _guard) = capture_logs();

        let outcome = service.delete_product("Ghost").await.unwrap();

        assert_eq!(outcome, DeleteOutcome::NotFound);
        assert_eq!(logs.count(Level::ERROR), 1);
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let (service, store) = service();
        service.add_product("Widget", 10, price("2.50")).await.unwrap();

        let outcome = service.delete_product("Widget").await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted(1));
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let (service, store) = service();

        assert!(matches!(
            service.add_product("  ", 1, price("1.00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.add_product("Widget", -1, price("1.00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.add_product("Widget", MAX_QUANTITY + 1, price("1.00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.add_product("Widget", 1, price("-1.00")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.find_product("").await,
            Err(AppError::Validation(_))
        ));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (service, store) = service();
        let (logs, _guard) = capture_logs();
        store.fail_next(GatewayError::Store("connection reset".to_string()));

        let err = service.list_products().await.unwrap_err();

        assert!(err.is_store_failure());
        // Logged once by the gateway before it returned.
        assert_eq!(logs.count(Level::ERROR), 1);
    }

    #[tokio::test]
    async fn test_unexpected_failure_propagates() {
        let (service, store) = service();
        store.fail_next(GatewayError::Unexpected("decode failed".to_string()));

        let err = service.delete_product("Widget").await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(GatewayError::Unexpected(_))));
    }
}
