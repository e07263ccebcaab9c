//! Gateway entry point: logging, settings, storage bootstrap, serve.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use loadout_gateway::server::RpcImpl;
use loadout_gateway::{SessionCache, Settings, serve};
use loadout_storage::{ConfigRepository, Database, DocumentStore, SurrealSessionStore, SurrealStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::parse();

    let db = Database::connect(&settings.db_endpoint, &settings.db_namespace, &settings.db_name)
        .await
        .context("failed to connect to database")?;
    info!(endpoint = %settings.db_endpoint, "connected to database");

    let deadline = settings.storage_timeout();
    let store = SurrealStore::new(&db, deadline);
    store
        .ensure_index()
        .await
        .context("failed to bootstrap config table")?;

    let session_store = SurrealSessionStore::new(&db, deadline);
    session_store
        .ensure_index()
        .await
        .context("failed to bootstrap session index")?;

    let repository = Arc::new(ConfigRepository::new(
        Arc::new(store),
        settings.max_value_length,
    ));
    let sessions = Arc::new(SessionCache::new(
        Arc::new(session_store),
        settings.session_cache_size,
        settings.session_cache_ttl(),
    ));

    let (_, handle) = serve(
        settings.bind_addr,
        settings.max_payload_bytes,
        RpcImpl::new(repository, sessions),
    )
    .await?;

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");
    let _ = handle.stop();
    handle.stopped().await;
    Ok(())
}
