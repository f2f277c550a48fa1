//! # Payment Gateway Trait
//!
//! Seam between the HTTP layer and the third-party payment gateway.
//! Implementations: Razorpay (`tally-razorpay`).

use crate::error::TallyResult;
use crate::order::{GatewayOrder, OrderRequest};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment gateway implementations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order on the gateway.
    ///
    /// # Arguments
    /// * `request` - Amount, currency and receipt for the order
    ///
    /// # Returns
    /// The gateway's order object.
    async fn create_order(&self, request: &OrderRequest) -> TallyResult<GatewayOrder>;

    /// Check a client-submitted payment signature.
    ///
    /// A mismatch is a `false` outcome, not an error. Pure computation.
    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a shared payment gateway (dynamic dispatch)
pub type BoxedPaymentGateway = Arc<dyn PaymentGateway>;
