//! # Razorpay Orders
//!
//! Implementation of the Razorpay Orders API and payment signature check.
//! An order must exist before the client opens Razorpay Checkout.

use crate::config::RazorpayConfig;
use crate::signature::verify_payment_signature;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tally_core::{GatewayOrder, OrderRequest, PaymentGateway, TallyError, TallyResult};
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "razorpay";

/// Razorpay gateway
///
/// Creates orders over the REST API and checks checkout signatures locally.
pub struct RazorpayGateway {
    config: RazorpayConfig,
    client: Client,
}

impl RazorpayGateway {
    /// Create a new Razorpay gateway
    pub fn new(config: RazorpayConfig) -> TallyResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                TallyError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> TallyResult<Self> {
        let config = RazorpayConfig::from_env()?;
        Self::new(config)
    }

    fn upstream(message: impl Into<String>) -> TallyError {
        TallyError::Upstream {
            provider: PROVIDER.to_string(),
            message: message.into(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    #[instrument(skip(self, request), fields(receipt = %request.receipt, amount = request.amount))]
    async fn create_order(&self, request: &OrderRequest) -> TallyResult<GatewayOrder> {
        let url = format!("{}/v1/orders", self.config.api_base_url);

        debug!(
            "Creating Razorpay order: amount={} {}",
            request.amount, request.currency
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Self::upstream("Razorpay request timed out")
                } else {
                    Self::upstream(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::upstream(e.to_string()))?;

        if !status.is_success() {
            error!("Razorpay API error: status={}, body={}", status, body);

            // Parse Razorpay error
            if let Ok(error_response) = serde_json::from_str::<RazorpayErrorResponse>(&body) {
                if let Some(description) = error_response.error.description {
                    return Err(Self::upstream(description));
                }
            }

            return Err(Self::upstream(format!("HTTP {}: {}", status, body)));
        }

        let order: GatewayOrder = serde_json::from_str(&body).map_err(|e| {
            TallyError::Serialization(format!("Failed to parse Razorpay response: {}", e))
        })?;

        info!("Created Razorpay order: id={}", order.id);

        Ok(order)
    }

    fn verify_payment(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let valid =
            verify_payment_signature(&self.config.key_secret, order_id, payment_id, signature);
        if !valid {
            warn!(order_id, payment_id, "Payment signature mismatch");
        }
        valid
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Razorpay API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct RazorpayErrorResponse {
    error: RazorpayError,
}

#[derive(Debug, Deserialize)]
struct RazorpayError {
    #[serde(default)]
    #[allow(dead_code)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}
