//! Listener, routing and process lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::api::{self, AppState, Services};
use crate::config::Config;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::handle_v1))
        .route("/v0", get(api::handle_legacy))
        .route("/v1", get(api::handle_v1))
        .route("/v2/me", get(api::handle_me))
        .with_state(state)
}

/// Binds `config.listen_addr` and serves until SIGINT or SIGTERM.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(Services::from_config(&config));

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.listen_addr, e))?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal.cancel();
    });

    serve(listener, router(state), shutdown, config.shutdown_grace).await
}

/// Serves `app` on `listener` until `shutdown` is cancelled, then drains
/// in-flight requests for at most `grace`.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
    grace: Duration,
) -> anyhow::Result<()> {
    info!(addr = %listener.local_addr()?, "server starting");

    let stopping = shutdown.clone();
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async move { stopping.cancelled().await });
    let server = std::future::IntoFuture::into_future(server);
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => {
            result.map_err(|e| anyhow::anyhow!("Server error: {}", e))?;
        }
        _ = shutdown.cancelled() => {
            info!("shutting down the server");
            match tokio::time::timeout(grace, &mut server).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "server shutdown failed"),
                Err(_) => warn!(?grace, "grace period elapsed, abandoning in-flight requests"),
            }
        }
    }

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
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
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("signal received: interrupt"),
        _ = terminate => info!("signal received: terminate"),
    }
}
