use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use gobank::infrastructure::logging::{init_logging, LoggingConfig};
use gobank::infrastructure::{
    AccountStore, AppConfig, InMemoryAccountStore, PostgresAccountStore, StorageBackend,
    TokenService,
};
use gobank::web::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    let _log_guard = init_logging(&LoggingConfig {
        log_dir: config.log_dir.clone(),
        ..Default::default()
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    if let Err(e) = run(config).await {
        error!("fatal: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!(backend = ?config.storage_backend, "starting account service");

    let store: Arc<dyn AccountStore> = match config.storage_backend {
        StorageBackend::Postgres => {
            let store =
                PostgresAccountStore::connect(&config.database_url, config.database_pool_size)
                    .await
                    .context("cannot connect to storage")?;
            store.init().await.context("cannot create schema")?;
            Arc::new(store)
        }
        StorageBackend::Memory => Arc::new(InMemoryAccountStore::new()),
    };

    let tokens = TokenService::new(&config.auth_config());
    let app = create_router(AppState::new(store, tokens));

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.listen_addr))?;
    info!("JSON API server listening on {}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
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
    info!("shutdown signal received");
}
