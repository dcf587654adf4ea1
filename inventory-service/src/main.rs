//! Inventory tracker entry point
//!
//! Runs the interactive menu against MySQL, or against the in-memory store
//! when started with `--in-memory`.

use std::io;
use std::sync::Arc;

use anyhow::Context;
use auth::HmacSha256Verifier;
use db::{CallGateway, MySqlGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use inventory_service::{
    InMemoryStore, InventoryConfig, InventoryService, Menu, SessionService,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; the menu owns stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inventory_service=info,db=info,auth=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = InventoryConfig::from_env().context("Failed to load configuration")?;
    let verifier = match &config.credential_pepper {
        Some(pepper) => HmacSha256Verifier::with_pepper(pepper.as_bytes()),
        None => HmacSha256Verifier::new(),
    };

    if std::env::args().skip(1).any(|arg| arg == "--in-memory") {
        tracing::info!("Starting inventory tracker with the in-memory store");
        let store = Arc::new(InMemoryStore::new());
        return run(store, verifier).await;
    }

    let db_config = config
        .db_config()
        .context("Failed to resolve the database connection")?;
    tracing::info!(
        "Starting inventory tracker against {}",
        db_config.redacted()
    );

    let gateway = MySqlGateway::new(db_config);
    if gateway.health_check().await.is_err() {
        tracing::warn!("Database is not reachable yet; calls will fail until it is");
    }

    run(gateway, verifier).await
}

async fn run<G>(gateway: G, verifier: HmacSha256Verifier) -> anyhow::Result<()>
where
    G: CallGateway + Clone,
{
    let inventory = InventoryService::new(gateway.clone());
    let session = SessionService::with_verifier(gateway, verifier);

    let stdin = io::stdin();
    let mut menu = Menu::new(inventory, session, stdin.lock(), io::stdout());
    menu.run().await.context("Menu I/O failed")?;
    Ok(())
}
