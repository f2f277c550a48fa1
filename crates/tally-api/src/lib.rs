//! # tally-api
//!
//! HTTP API layer for rupee-tally.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Order creation through the payment gateway
//! - Payment verification with token issuance
//! - Token-gated counter reads
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Liveness text |
//! | GET | `/health` | Health check |
//! | POST | `/create-order` | Create gateway order |
//! | POST | `/verify` | Verify payment, returns `{success, token, count}` |
//! | GET | `/count` | Current count (Bearer token) |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, create_router_with_timeout};
pub use state::{AppConfig, AppState};
