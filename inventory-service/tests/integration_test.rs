//! Integration tests for the session and inventory services
//!
//! Both services share one in-memory store, the way the binary shares one
//! gateway between them.

use std::str::FromStr;
use std::sync::Arc;

use error::{AppError, AuthError};
use inventory_service::{
    DeleteOutcome, InMemoryStore, InventoryService, SessionService, NO_IDENTITY,
};
use rust_decimal::Decimal;

fn services() -> (
    SessionService<Arc<InMemoryStore>>,
    InventoryService<Arc<InMemoryStore>>,
    Arc<InMemoryStore>,
) {
    let store = Arc::new(InMemoryStore::new());
    (
        SessionService::new(store.clone()),
        InventoryService::new(store.clone()),
        store,
    )
}

#[tokio::test]
async fn test_register_login_and_manage_stock() {
    let (mut session, inventory, store) = services();

    session.register("alice", "Passw0rd").await.unwrap();
    assert!(store.password_hash("alice").is_some());

    session.login("alice", "Passw0rd").await.unwrap();
    assert_eq!(session.current_identity(), Some("alice"));

    let price = Decimal::from_str("2.50").unwrap();
    inventory.add_product("Widget", 10, price).await.unwrap();
    assert_eq!(store.products().len(), 1);

    let found = inventory.find_product("Widget").await.unwrap().unwrap();
    assert_eq!(found.quantity, 10);
    assert_eq!(found.price, price);

    let outcome = inventory.delete_product("Widget").await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted(1));

    assert!(inventory.find_product("Widget").await.unwrap().is_none());

    session.logout();
    assert_eq!(session.current_identity_display(), NO_IDENTITY);
}

#[tokio::test]
async fn test_login_without_registration() {
    let (mut session, _, _) = services();

    let result = session.login("alice", "Passw0rd").await;

    assert!(matches!(
        result,
        Err(AppError::Auth(AuthError::InvalidCredentials))
    ));
    assert_eq!(session.current_identity(), None);
}

#[tokio::test]
async fn test_missing_product_is_not_an_error() {
    let (_, inventory, _) = services();

    assert!(inventory.find_product("Ghost").await.unwrap().is_none());
    assert_eq!(
        inventory.delete_product("Ghost").await.unwrap(),
        DeleteOutcome::NotFound
    );
    assert!(inventory.list_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_twice() {
    let (mut session, _, _) = services();
    session.register("alice", "Passw0rd").await.unwrap();
    session.login("alice", "Passw0rd").await.unwrap();

    assert_eq!(session.logout().as_deref(), Some("alice"));
    assert_eq!(session.logout(), None);
    assert_eq!(session.current_identity(), None);
}
