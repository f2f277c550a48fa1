//! # tally-razorpay
//!
//! Razorpay gateway for rupee-tally.
//!
//! This crate provides:
//!
//! 1. **RazorpayGateway** - `PaymentGateway` implementation
//!    - Orders API (`POST /v1/orders`) with basic auth
//!    - Checkout signature verification
//!
//! 2. **signature** - the HMAC-SHA256 construction Razorpay uses to sign
//!    `order_id|payment_id` after a completed checkout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tally_razorpay::RazorpayGateway;
//! use tally_core::{OrderTemplate, PaymentGateway};
//!
//! // Create gateway from environment
//! let gateway = RazorpayGateway::from_env()?;
//!
//! // Create an order for ₹1
//! let order = gateway
//!     .create_order(&OrderTemplate::default().to_request(chrono::Utc::now()))
//!     .await?;
//!
//! // Hand order.id to Razorpay Checkout on the client
//! ```

pub mod config;
pub mod orders;
pub mod signature;

// Re-exports
pub use config::RazorpayConfig;
pub use orders::RazorpayGateway;
pub use signature::{payment_signature, verify_payment_signature};
