//! StudyHub REST API server.

use anyhow::Context;
use std::net::SocketAddr;
use studyhub_api_rest::{create_app, AppState};
use studyhub_common::{config::AppConfig, telemetry};
use studyhub_infrastructure::{DatabaseConfig, DatabasePool, Repositories};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    telemetry::init_from_config(&config.telemetry)?;

    let (repositories, database) = match DatabaseConfig::from_app_config(&config.database) {
        Some(db_config) => {
            let pool = DatabasePool::new(&db_config)
                .await
                .context("Failed to connect to PostgreSQL")?;
            pool.migrate().await.context("Failed to run migrations")?;
            info!("Using PostgreSQL store");
            (Repositories::postgres(&pool), Some(pool))
        }
        None => {
            warn!("No database URL configured; data lives in memory and is lost on exit");
            (Repositories::in_memory(), None)
        }
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, repositories, database);
    let app = create_app(state)?;

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(address = %addr, "StudyHub API listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
