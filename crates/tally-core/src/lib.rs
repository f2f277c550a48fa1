//! # tally-core
//!
//! Core types and traits for the rupee-tally payment counter.
//!
//! This crate provides:
//! - `PaymentGateway` trait for order creation and payment signature checks
//! - `CounterStore` trait for the persisted payment counter
//! - `TokenIssuer` for signing and validating access tokens
//! - `PaymentVerifier`, the verification state machine
//! - `TallyError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use tally_core::{PaymentVerifier, TokenIssuer, VerificationRequest};
//!
//! let tokens = TokenIssuer::with_default_validity(&jwt_secret)?;
//! let verifier = PaymentVerifier::new(gateway, store, tokens);
//!
//! let receipt = verifier
//!     .verify(VerificationRequest::new(order_id, payment_id, signature))
//!     .await?;
//! println!("count is now {}", receipt.count);
//! ```

pub mod counter;
pub mod error;
pub mod gateway;
pub mod order;
pub mod token;
pub mod verification;

// Re-exports for convenience
pub use counter::{BoxedCounterStore, CounterStore, TimeoutCounterStore, COUNTER_ROW_ID};
pub use error::{TallyError, TallyResult};
pub use gateway::{BoxedPaymentGateway, PaymentGateway};
pub use order::{GatewayOrder, OrderRequest, OrderTemplate};
pub use token::{bearer_token, AccessClaims, TokenIssuer};
pub use verification::{
    PaymentProof, PaymentVerifier, Rejection, VerificationReceipt, VerificationRequest,
    VerificationStage,
};
