//! # Request Handlers
//!
//! Axum request handlers for the payment counter API.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use tally_core::{bearer_token, GatewayOrder, TallyError, VerificationRequest};
use tracing::{debug, error, info, instrument};

// =============================================================================
// Response Types
// =============================================================================

/// Error response for order creation
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Successful verification
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub token: String,
    pub count: i64,
}

/// Failed verification
#[derive(Debug, Serialize)]
pub struct VerifyFailure {
    pub success: bool,
    pub message: String,
}

/// Current counter value
#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Message-only error body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn status_for(err: &TallyError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn verify_error_to_response(err: TallyError) -> (StatusCode, Json<VerifyFailure>) {
    (
        status_for(&err),
        Json(VerifyFailure {
            success: false,
            message: err.client_message(),
        }),
    )
}

fn count_error_to_response(err: TallyError) -> (StatusCode, Json<MessageResponse>) {
    (
        status_for(&err),
        Json(MessageResponse {
            message: err.client_message(),
        }),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Liveness text
pub async fn root() -> &'static str {
    "rupee-tally API is running"
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rupee-tally",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.store.backend_name()
    }))
}

/// Create a gateway order from the configured template
#[instrument(skip(state), fields(provider = state.gateway.provider_name()))]
pub async fn create_order(
    State(state): State<AppState>,
) -> Result<Json<GatewayOrder>, (StatusCode, Json<ErrorResponse>)> {
    let request = state.order_template.to_request(Utc::now());

    match state.gateway.create_order(&request).await {
        Ok(order) => {
            info!("Order created: {}", order.id);
            Ok(Json(order))
        }
        Err(e) => {
            error!("Failed to create order: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.client_message())),
            ))
        }
    }
}

/// Verify a checkout payment, bump the counter and issue an access token
#[instrument(skip(state, payload))]
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, (StatusCode, Json<VerifyFailure>)> {
    // An unreadable body carries no fields
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Verification body rejected: {}", rejection);
            return Err(verify_error_to_response(TallyError::MissingFields));
        }
    };

    let receipt = state
        .verifier
        .verify(request)
        .await
        .map_err(verify_error_to_response)?;

    Ok(Json(VerifyResponse {
        success: true,
        token: receipt.token,
        count: receipt.count,
    }))
}

/// Read the counter; requires a bearer token from `/verify`
#[instrument(skip(state, headers))]
pub async fn count(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<CountResponse>, (StatusCode, Json<MessageResponse>)> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| count_error_to_response(TallyError::Unauthorized))?;

    state
        .tokens
        .validate(token)
        .map_err(count_error_to_response)?;

    let count = state.store.get().await.map_err(|e| {
        error!("Failed to read counter: {}", e);
        count_error_to_response(e)
    })?;

    Ok(Json(CountResponse { count }))
}
