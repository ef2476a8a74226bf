//! HTTP API over the task service.

mod routes;
mod state;

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use tasky_core::{FileTaskRepository, TaskService};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    routes::router()
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(service: TaskService<FileTaskRepository>, addr: SocketAddr) -> Result<()> {
    tracing::info!(path = %service.repository().path().display(), "using task file");
    let app = app(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("tasky API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
