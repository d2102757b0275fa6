use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod responses;
mod routes;
mod services;

use services::backend::{SharedBackend, StorageBackend};
use services::memory::InMemoryBackend;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;
    tracing::info!("Starting storage-testbench with config: {:?}", cfg);

    // --- Initialize backend ---
    let backend: SharedBackend = Arc::new(InMemoryBackend::new());

    // --- Pre-seed buckets ---
    // A seed list that conflicts with itself (same name, different
    // versioning flag) is a configuration error reported through the
    // normal error channel, never a panic.
    for seed in &cfg.seed_buckets {
        backend
            .create_bucket(&seed.name, seed.versioning_enabled)
            .with_context(|| format!("seeding bucket `{}`", seed.name))?;
        tracing::info!(
            bucket = %seed.name,
            versioning = seed.versioning_enabled,
            "seeded bucket"
        );
    }

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(backend);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
