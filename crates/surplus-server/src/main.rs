mod config;

use std::sync::Arc;

use tracing::info;

use surplus_api::routes;
use surplus_api::seed;
use surplus_api::state::AppStateInner;
use surplus_db::Database;
use surplus_gateway::dispatcher::Dispatcher;

use crate::config::{Config, IN_MEMORY};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surplus=debug,surplus_api=debug,surplus_gateway=debug,surplus_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init store
    let db = if config.db_path.as_os_str() == IN_MEMORY {
        Database::open_in_memory()?
    } else {
        Database::open(&config.db_path)?
    };
    let db = Arc::new(db);

    if config.seed_samples {
        seed::seed_samples_if_empty(db.as_ref())?;
    }

    let state = AppStateInner::new(db, Dispatcher::new(), config.settings());
    let app = routes::router(state);

    info!("Surplus Food Connect listening on {}", config.addr);
    info!(
        "Dashboard poll every {}s, strict login {}",
        config.poll_interval.as_secs(),
        if config.strict_login { "on" } else { "off" }
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(_) => {
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
