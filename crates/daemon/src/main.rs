//! Vaidya Queue Engine - Main Entry Point
//! JSON-RPC server over the queue registry and ordering engine

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Import workspace crates
use crate::config::DaemonConfig;
use vaidya_api_rpc::{RpcServer, RpcServerConfig};
use vaidya_core::application::{
    MutationHooks, QueueEngine, QueueLocks, QueueRegistry, ReadCache,
};
use vaidya_core::port::id_provider::UuidProvider;
use vaidya_core::port::time_provider::SystemTimeProvider;
use vaidya_core::port::{
    AuditLog, Cache, IdProvider, QueueRepository, TimeProvider, TransactionalQueueRepository,
};
use vaidya_infra_cache::MokaCache;
use vaidya_infra_sqlite::{create_pool, run_migrations, SqliteAuditLog, SqliteQueueRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::load()?;

    // 2. Initialize logging
    init_logging(&config.log_format)?;
    info!("Vaidya Queue Engine v{} starting...", VERSION);

    if telemetry::requested() && !telemetry::compiled_in() {
        warn!("OpenTelemetry endpoint set but feature 'telemetry' not enabled");
    }

    // 3. Initialize database
    if let Some(dir) = config.database_dir() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create database directory {}", dir.display()))?;
    }
    let database_url = config.database_url();
    info!(database_url = %database_url, "Initializing database...");

    let pool = create_pool(&database_url)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 4. Setup dependencies (DI wiring)
    let engine_config = config.engine_config();
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider: Arc<dyn IdProvider> = Arc::new(UuidProvider);
    let store = Arc::new(SqliteQueueRepository::new(pool.clone()));
    let tx_repo: Arc<dyn TransactionalQueueRepository> = store.clone();
    let repo: Arc<dyn QueueRepository> = store;
    let cache: Arc<dyn Cache> = Arc::new(MokaCache::new());
    let audit: Arc<dyn AuditLog> = Arc::new(SqliteAuditLog::new(pool.clone()));

    let locks = Arc::new(QueueLocks::new(engine_config.lock_timeout));
    let hooks = Arc::new(MutationHooks::new(
        cache.clone(),
        audit,
        time_provider.clone(),
    ));
    let read_cache = Arc::new(ReadCache::new(cache, engine_config.cache_ttl));

    let registry = Arc::new(QueueRegistry::new(
        tx_repo.clone(),
        repo.clone(),
        id_provider.clone(),
        time_provider.clone(),
        locks.clone(),
        hooks.clone(),
        read_cache.clone(),
        &engine_config,
    ));
    let engine = Arc::new(QueueEngine::new(
        tx_repo,
        repo,
        id_provider,
        time_provider,
        locks,
        hooks,
        read_cache,
        &engine_config,
    ));

    // 5. Start JSON-RPC server
    info!("Starting JSON-RPC server...");
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, registry, engine)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Waiting for requests...");
    info!("Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}

/// `json` for production log shipping, anything else for coloured output
fn init_logging(log_format: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("vaidya=info"))
        .context("Failed to create env filter")?;

    let fmt_layer = match log_format {
        "json" => fmt::layer().json().boxed(),
        _ => fmt::layer().pretty().boxed(),
    };

    let registry = tracing_subscriber::registry().with(env_filter).with(fmt_layer);
    let otel = telemetry::otel_layer()?;
    let enabled = otel.is_some();

    registry
        .with(otel)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if enabled {
        info!("OpenTelemetry initialized successfully");
    }
    Ok(())
}
