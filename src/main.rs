//! bankd - HTTP server entry point
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │  Config  │───▶│ Backend  │───▶│   Registry   │───▶│ Gateway  │
//! │  (YAML)  │    │(mem / pg)│    │(svc + engine)│    │  (axum)  │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//! ```
//!
//! Usage: `bankd [--env dev] [--port 8080]`

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::RngCore;
use tokio::net::TcpListener;

use bankd::access::{Argon2Hasher, TokenIssuer};
use bankd::config::AppConfig;
use bankd::gateway::{self, state::AppState};
use bankd::persistence::open_backend;
use bankd::registry::ServiceRegistry;

/// Length of the generated signing secret, in bytes
const GENERATED_SECRET_LEN: usize = 50;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn generate_secret() -> String {
    let mut bytes = [0u8; GENERATED_SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received, draining connections");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    app_config.validate()?;
    let _log_guard = bankd::logging::init_logging(&app_config);

    tracing::info!(
        "Starting bankd {} ({}) in {} mode",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env
    );

    let jwt_secret = match app_config.auth.jwt_secret.clone() {
        Some(secret) => secret,
        None => {
            tracing::warn!("JWT_SECRET not set; generated a random secret, sessions end on restart");
            generate_secret()
        }
    };

    let backend = open_backend(&app_config.storage)
        .await
        .context("failed to open storage backend")?;
    let registry = ServiceRegistry::new(
        backend,
        Arc::new(Argon2Hasher::new()),
        Duration::from_millis(app_config.transfer_timeout_ms),
    )?;
    let tokens = TokenIssuer::new(jwt_secret.as_bytes(), app_config.auth.token_ttl_secs);
    let state = Arc::new(AppState::new(Arc::new(registry), Arc::new(tokens)));

    let addr = format!("{}:{}", app_config.gateway.host, app_config.gateway.port);
    let listener = TcpListener::bind(&addr).await.with_context(|| {
        format!(
            "failed to bind {} (port {} may already be in use)",
            addr, app_config.gateway.port
        )
    })?;

    gateway::run_server(listener, state, shutdown_signal()).await?;
    tracing::info!("bankd stopped");
    Ok(())
}
