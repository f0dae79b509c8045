// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use std::sync::Arc;

use tinta_kernel::types::Product;
use tinta_node::catalog::Catalog;
use tinta_node::config::NodeConfig;
use tinta_node::network::VisionExtractor;
use tinta_node::persistence::{FileTarget, PersistTarget};
use tinta_node::server::{build_router, AppState};
use tinta_node::store::Store;
use tinta_node::telemetry::init_telemetry;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_telemetry()?;

    let cfg = NodeConfig::load()?;
    tracing::info!("Initializing Tinta Node with config: {:?}", cfg);

    let target = cfg
        .store_path
        .clone()
        .map(|path| Arc::new(FileTarget::new(path)) as Arc<dyn PersistTarget>);
    if target.is_none() {
        tracing::warn!("No store path configured, products live in memory only");
    }
    let products: Store<Product> = Store::open("products", target, cfg.store_config());

    let mut catalog = Catalog::new(products.clone(), cfg.color_metric);
    match &cfg.vision_endpoint {
        Some(endpoint) => {
            tracing::info!(%endpoint, "Color extraction enabled");
            let extractor = VisionExtractor::new(endpoint.clone(), cfg.vision_api_key.clone());
            catalog = catalog.with_extractor(Arc::new(extractor));
        }
        None => tracing::info!("No vision endpoint configured, color import disabled"),
    }

    let state = AppState {
        catalog,
        default_suggestions: cfg.default_suggestions,
    };
    let app = build_router(state, cfg.auth_token.clone());

    let addr = cfg.bind_addr;
    tracing::info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down, draining pending writes");
    products.flush().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
