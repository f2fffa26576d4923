//! HTTP server setup and routing
//!
//! Sets up the Axum server with the follow-up and trainer routes. All
//! handlers share one application context: the database pool and the clock.

use crate::error::{Error, Result};
use axum::{
    routing::{delete, get, post},
    Router,
};
use cadence_common::time::Clock;
use sqlx::SqlitePool;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared application context passed to all handlers
///
/// AppContext implements Clone, which gives us `FromRef<AppContext>` for
/// free via Axum's blanket implementation.
#[derive(Clone)]
pub struct AppContext {
    pub db: SqlitePool,
    pub clock: Arc<dyn Clock>,
}

/// Build the application router
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Follow-up sequences
        .route("/followups", post(super::handlers::create_followup))
        .route("/followups", get(super::handlers::list_followups))
        .route(
            "/followups/:id/steps/:step",
            post(super::handlers::complete_step),
        )
        .route(
            "/followups/:id/steps/:step",
            delete(super::handlers::undo_step),
        )
        .route("/followups/:id/status", post(super::handlers::set_status))
        .route("/followups/:id", delete(super::handlers::delete_followup))
        // Trainer
        .route("/trainer/answers", post(super::handlers::record_answer))
        .route("/trainer/reviews/due", get(super::handlers::due_reviews))
        .route("/trainer/sessions", post(super::handlers::start_session))
        .route(
            "/trainer/sessions/:id/responses",
            post(super::handlers::record_response),
        )
        .route(
            "/trainer/sessions/:id/complete",
            post(super::handlers::complete_session),
        )
        .route("/trainer/sessions/:id", get(super::handlers::get_session))
        .with_state(ctx)
        // Enable CORS for local dashboard access
        .layer(CorsLayer::permissive())
}

/// Run the HTTP API server until shutdown is signaled
pub async fn run<F>(ctx: AppContext, port: u16, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
