//! Application setup and initialization
//!
//! All startup wiring lives here: telemetry, the long-lived RPC channels,
//! the storage and CDN handles, and the router.

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use imago_core::Config;
use imago_rpc::{AuthClient, EnhancementClient};
use imago_storage::{create_storage, CloudFrontCdn};

use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    // Long-lived RPC channels; established lazily, shared by all requests
    let auth_client = AuthClient::connect(
        config.auth_service_endpoint(),
        config.auth_rpc_timeout,
        config.token_validate_timeout,
    )
    .context("Failed to create auth service client")?;

    let enhancement_client = EnhancementClient::connect(
        config.enhancement_service_endpoint(),
        config.enhancement_rpc_timeout,
    )
    .context("Failed to create enhancement service client")?;

    // Object storage and CDN front
    let storage = create_storage(&config)
        .await
        .context("Failed to create storage backend")?;

    let cdn = Arc::new(
        CloudFrontCdn::new(config.cdn_domain.clone(), config.cdn_distribution_id.clone()).await,
    );

    let state = Arc::new(AppState {
        is_production: config.is_production(),
        storage,
        cdn,
        enhancer: Arc::new(enhancement_client),
        auth_client,
        config: config.clone(),
    });

    tracing::info!(
        is_production = state.is_production,
        storage_backend = %config.storage_backend,
        "Application state initialized"
    );

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
