//! nodecfg control daemon.
//!
//! Serves the configuration-state API for this node.

use std::sync::Arc;

use nodecfg_control::http::create_router;
use nodecfg_control::{ConfigStateService, NodeConfig, StoreProvisioner};
use nodecfg_registry::StaticRegistry;
use nodecfg_store::MemoryStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nodecfg=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting nodecfg control");

    let config = NodeConfig::from_env();

    let registry = match &config.catalog_path {
        Some(path) => Arc::new(StaticRegistry::from_file(path)?),
        None => {
            tracing::warn!("No CATALOG_PATH set, serving an empty registry");
            Arc::new(StaticRegistry::new())
        }
    };

    let store = Arc::new(MemoryStore::new());
    let provisioner = Arc::new(StoreProvisioner::new(
        Arc::clone(&store),
        Arc::clone(&registry),
    ));

    let control_config = config.control_config();
    tracing::info!(arch = %control_config.node_arch(), "Resolving workloads for node architecture");

    let control = Arc::new(ConfigStateService::new(
        store,
        registry,
        provisioner,
        control_config,
    ));

    let app = create_router(control);

    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
