//! # myhoused: MyHouse OS daemon
//!
//! Composition root that wires all adapters together and starts the servers.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the event bus, state store, rule engine and broadcast hub
//! - Seed the bootstrap client, if configured
//! - Serve the HTTP command surface and the MCP listener
//! - Handle graceful shutdown (SIGTERM/SIGINT), then wait for in-flight
//!   rule cascades to finish
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use myhouse_adapter_cipher_chacha::ChaChaTokenCipher;
use myhouse_adapter_http_axum::state::AppState;
use myhouse_adapter_mcp_axum::state::McpState;
use myhouse_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqliteCredentialRepository, SqliteStateRepository,
};
use myhouse_app::broadcast_hub::BroadcastHub;
use myhouse_app::event_bus::EventBus;
use myhouse_app::rule_engine::RuleEngine;
use myhouse_app::services::auth_gate::AuthGate;
use myhouse_app::services::client_service::ClientService;
use myhouse_app::state_store::StateStore;
use myhouse_domain::rule::canonical_rules;

/// Used when no encryption key is configured. Tokens sealed with it are only
/// as safe as this source file.
const DEVELOPMENT_KEY: &str = "myhouse-os-development-key";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let state_repo = SqliteStateRepository::new(db.pool().clone());
    let credential_repo = SqliteCredentialRepository::new(db.pool().clone());

    // Crypto
    let cipher = match config.security.encryption_key.as_deref() {
        Some(key) => ChaChaTokenCipher::from_passphrase(key),
        None => {
            tracing::warn!("no encryption key configured, using the development key");
            ChaChaTokenCipher::from_passphrase(DEVELOPMENT_KEY)
        }
    };

    // Core
    let bus = Arc::new(EventBus::new());
    let store = Arc::new(StateStore::new(state_repo, Arc::clone(&bus)));
    let (_engine, _) = RuleEngine::new(Arc::clone(&store), canonical_rules())
        .with_max_depth(config.rules.max_depth)
        .start();
    let hub = BroadcastHub::new(Arc::clone(&store)).start();

    // Services
    let auth_gate = Arc::new(AuthGate::new(credential_repo.clone(), cipher.clone()));
    let client_service = Arc::new(ClientService::new(credential_repo, cipher));

    if let Some((client_id, client_token)) = config.bootstrap.client() {
        client_service.register(client_id, client_token).await?;
        tracing::info!(client_id, "bootstrap client seeded");
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown requested");
        let _ = stop_tx.send(true);
    });

    // HTTP
    let http = myhouse_adapter_http_axum::router::build(AppState::from_arcs(
        Arc::clone(&store),
        Arc::clone(&hub),
        Arc::clone(&auth_gate),
        client_service,
    ));
    let listener = TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %listener.local_addr()?, "http listening");
    let http_server =
        axum::serve(listener, http).with_graceful_shutdown(stopped(stop_rx.clone()));

    // MCP
    let mcp_server = if config.mcp.enabled {
        let mcp = myhouse_adapter_mcp_axum::router::build(McpState::new(
            Arc::clone(&store),
            auth_gate,
        ));
        let listener = TcpListener::bind(config.mcp_bind_addr()).await?;
        tracing::info!(addr = %listener.local_addr()?, "mcp listening");
        Some(axum::serve(listener, mcp).with_graceful_shutdown(stopped(stop_rx)))
    } else {
        None
    };

    match mcp_server {
        Some(mcp_server) => {
            tokio::try_join!(
                async { http_server.await },
                async { mcp_server.await }
            )?;
        }
        None => http_server.await?,
    }

    hub.stop();
    bus.wait_idle().await;
    db.close().await;
    tracing::info!("myhoused stopped");
    Ok(())
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
