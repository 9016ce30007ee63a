//! Binary entrypoint for the flowgate HTTP server.
//!
//! Configuration comes from environment variables (see
//! [`flowgate_server::config`]); `FLOWGATE_LOG` sets the log filter
//! (default: "info").

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use flowgate_server::config::ServerConfig;
use flowgate_server::router::build_router;
use flowgate_server::state::AppState;

const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("FLOWGATE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run().await {
        tracing::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let config = ServerConfig::from_env()?;
    tracing::info!(
        "Configuration: identity={}, warehouse={}, table={}, session_idle={}s",
        config
            .identity
            .as_ref()
            .map(|identity| identity.tenant_id.as_str())
            .unwrap_or("<none>"),
        config.warehouse.path.as_deref().unwrap_or("<none>"),
        config.warehouse.table,
        config.session_idle.as_secs()
    );

    let state = AppState::new(&config);
    state
        .sessions
        .start_idle_sweep(SESSION_SWEEP_INTERVAL, config.session_idle);

    let app = build_router(state.clone());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| format!("failed to bind {}: {}", addr, err))?;
    tracing::info!("flowgate server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| format!("server error: {}", err))?;

    state.close_warehouse().await;
    tracing::info!("flowgate server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
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
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
