//! REST API server module
//!
//! Exposes the report download endpoint plus health and OpenAPI documents.

use crate::{Result, error::Error};
use axum::{Router, routing::get};
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// - `GET /api/v1/students/:id/report` - Download a student's PDF report
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/students/:id/report", get(routes::student_report))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve the API on an already bound listener until `shutdown` resolves
///
/// In-flight requests are allowed to finish once `shutdown` completes.
///
/// # Errors
/// Returns [`Error::ApiServerError`] if the server fails while running
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_router(state);

    if let Ok(address) = listener.local_addr() {
        tracing::info!(address = %address, "API server listening");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

/// Start the API server on the configured bind address
///
/// Runs until `shutdown` resolves.
///
/// # Errors
/// Returns [`Error::Io`] if the address cannot be bound, or
/// [`Error::ApiServerError`] if the server fails while running
pub async fn start_api_server<F>(state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = state.config.api.bind_address;

    tracing::info!(address = %bind_address, "Starting API server");

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(Error::Io)?;

    serve(listener, state, shutdown).await
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
