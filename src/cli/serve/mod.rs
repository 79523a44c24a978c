//! Serve command - runs the HTTP API

use axum::Router;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use crate::api::create_router_with_state;
use crate::config::AppConfig;
use crate::domain::DomainError;
use crate::infrastructure::observability::{create_metrics_router, init_metrics};

/// Run the API server until Ctrl+C or SIGTERM
pub async fn run() -> anyhow::Result<()> {
    let config = super::prepare()?;

    let state = crate::create_app_state_with_config(&config).await?;

    if config.admin.bootstrap_on_startup {
        match state.account_service.bootstrap_admin().await {
            Ok(admin) => info!(user_id = %admin.id, "Default admin created"),
            Err(DomainError::DuplicateIdentity { .. }) => info!("Default admin already present"),
            Err(e) => warn!(error = %e, "Admin bootstrap failed"),
        }
    }

    let app = build_app(state, &config);

    let addr = config.bind_address();
    info!("Starting accounts API on {}", addr);

    let listener = TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

fn build_app(state: crate::api::AppState, config: &AppConfig) -> Router {
    let router = create_router_with_state(state, &config.cors);

    match init_metrics(&config.metrics) {
        Some(metrics) => router.merge(create_metrics_router(metrics, &config.metrics.path)),
        None => router,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
