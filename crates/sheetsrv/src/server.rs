use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::ServerResult;
use crate::handlers::{self, ServerState};

pub const ENDPOINTS: Endpoints = Endpoints {
    root: "/",
    create: "/create",
    values: "/values",
    batch_get_values: "/batchGetValues",
    batch_update_values: "/batchUpdateValues",
    append_values: "/appendValues",
};

#[derive(Debug)]
pub struct Endpoints {
    pub root: &'static str,
    pub create: &'static str,
    pub values: &'static str,
    pub batch_get_values: &'static str,
    pub batch_update_values: &'static str,
    pub append_values: &'static str,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(ENDPOINTS.root, get(handlers::greeting))
        .route(ENDPOINTS.create, post(handlers::create))
        .route(
            ENDPOINTS.values,
            get(handlers::get_values).put(handlers::update_values),
        )
        .route(ENDPOINTS.batch_get_values, get(handlers::batch_get_values))
        .route(
            ENDPOINTS.batch_update_values,
            put(handlers::batch_update_values),
        )
        .route(ENDPOINTS.append_values, post(handlers::append_values))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on `listener` until ctrl-c.
pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> ServerResult<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "failed to listen for shutdown signal");
        // Without a signal handler there's nothing to wait on, keep serving.
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
