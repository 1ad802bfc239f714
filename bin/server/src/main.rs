use cloudgate_platform_access::providers::builtin_registry;
use cloudgate_server::{
    config::ServerConfig, error::StartupError, router, state::AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> cloudgate_core::Result<(), StartupError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::load().map_err(|e| StartupError::Config {
        details: e.to_string(),
    })?;
    tracing::info!(
        content_root = %config.content_root.display(),
        root_uri = %config.root_uri,
        configuration_mode = config.configuration_mode,
        "Loaded configuration"
    );

    let addr = config.bind_address;
    let cleanup_interval = Duration::from_secs(config.session.cleanup_interval_seconds);
    let registry = builtin_registry();
    tracing::info!(
        registered = ?registry.ids().collect::<Vec<_>>(),
        enabled = ?config.auth.enabled_providers,
        "Auth providers"
    );
    let state = Arc::new(AppState::new(config, registry));

    // Spawn periodic session cleanup task
    let cleanup_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        loop {
            interval.tick().await;
            let count = cleanup_state.sessions.delete_expired().await;
            if count > 0 {
                tracing::debug!(deleted_sessions = count, "Periodic session cleanup");
            }
        }
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StartupError::Bind {
            address: addr.to_string(),
            details: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            details: e.to_string(),
        })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
