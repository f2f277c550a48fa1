//! # Routes
//!
//! Axum router configuration for the payment counter API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Whole-request bound; gateway and storage calls carry their own, shorter limits
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the main application router
///
/// Routes:
///   - GET  /              - Liveness text
///   - GET  /health        - Health check
///   - POST /create-order  - Create a gateway order
///   - POST /verify        - Verify a payment, returns token and count
///   - GET  /count         - Read the counter (Bearer token)
pub fn create_router(state: AppState) -> Router {
    create_router_with_timeout(state, REQUEST_TIMEOUT)
}

/// Router with a custom whole-request timeout; an elapsed request is a 500
pub fn create_router_with_timeout(state: AppState, request_timeout: Duration) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/create-order", post(handlers::create_order))
        .route("/verify", post(handlers::verify))
        .route("/count", get(handlers::count))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    request_timeout,
                ))
                .layer(cors),
        )
        // State
        .with_state(state)
}
