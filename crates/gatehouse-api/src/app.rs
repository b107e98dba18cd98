//! Application builder: wires router, middleware and state into an Axum app.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::DatabasePool;
use gatehouse_service::OperationLogSink;

use crate::error::set_expose_internal_errors;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::middleware::rate_limit::{RateLimiter, rate_limit};
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let config = Arc::clone(&state.config);
    set_expose_internal_errors(config.server.expose_internal_errors);

    build_router(state.clone())
        .layer(from_fn_with_state(state, rate_limit))
        .layer(from_fn(request_logging))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_seconds,
        )))
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config.server.cors))
        .layer(TraceLayer::new_for_http())
}

/// Runs the Gatehouse server until Ctrl-C or SIGTERM.
///
/// Connects the pool, applies migrations when configured, starts the
/// operation-log worker, and serves. On shutdown the log sink drains
/// before the pool closes.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse server...");

    // ── Step 1: Database ─────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;
    if config.database.run_migrations {
        db.migrate().await?;
    }
    let stores = db.stores();

    // ── Step 2: Operation log sink ───────────────────────────────
    let shutdown = CancellationToken::new();
    let (log_sink, sink_handle) =
        OperationLogSink::spawn(stores.logs.clone(), &config.operation_log, shutdown.clone());

    // ── Step 3: State and limiter housekeeping ───────────────────
    let addr = config.server.bind_addr();
    let state = AppState::new(config, stores, log_sink)?;
    spawn_limiter_purge(
        vec![
            Arc::clone(&state.rate_limiter),
            Arc::clone(&state.login_limiter),
        ],
        Duration::from_millis(limits_window(&state.config).max(1000)),
        shutdown.clone(),
    );

    // ── Step 4: Serve ────────────────────────────────────────────
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Gatehouse server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain ────────────────────────────────────────────
    // In-flight requests have finished, so nothing records after this.
    shutdown.cancel();
    if let Err(e) = sink_handle.await {
        tracing::error!(error = %e, "Operation log worker ended abnormally");
    }
    db.close().await;
    tracing::info!("Gatehouse server stopped");

    Ok(())
}

fn limits_window(config: &AppConfig) -> u64 {
    config
        .rate_limit
        .window_ms
        .min(config.rate_limit.login_window_ms)
}

fn spawn_limiter_purge(
    limiters: Vec<Arc<RateLimiter>>,
    every: Duration,
    shutdown: CancellationToken,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    for limiter in &limiters {
                        limiter.purge_expired();
                    }
                }
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
