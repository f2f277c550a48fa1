//! # Payment Verification
//!
//! Turns a client-submitted payment proof into a counter increment and an
//! access token.
//!
//! ```text
//! Pending ──► Validated ──► Authenticated ──► Recorded ──► Issued
//!    │            │               │
//!    ▼            ▼               ▼
//! MissingFields BadSignature  StorageError
//! ```
//!
//! Transitions are strictly sequential. A failure returns immediately and
//! nothing after it runs: a storage fault after authentication issues no
//! token.

use crate::counter::BoxedCounterStore;
use crate::error::{TallyError, TallyResult};
use crate::gateway::BoxedPaymentGateway;
use crate::token::TokenIssuer;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Body of a `/verify` request.
///
/// Fields are optional so that an absent field is reported as
/// "Missing fields" instead of a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationRequest {
    #[serde(default)]
    pub razorpay_order_id: Option<String>,
    #[serde(default)]
    pub razorpay_payment_id: Option<String>,
    #[serde(default)]
    pub razorpay_signature: Option<String>,
}

impl VerificationRequest {
    pub fn new(
        order_id: impl Into<String>,
        payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            razorpay_order_id: Some(order_id.into()),
            razorpay_payment_id: Some(payment_id.into()),
            razorpay_signature: Some(signature.into()),
        }
    }

    /// Check that every field is present and non-empty
    pub fn validate(self) -> TallyResult<PaymentProof> {
        fn present(field: Option<String>) -> TallyResult<String> {
            field
                .filter(|value| !value.is_empty())
                .ok_or(TallyError::MissingFields)
        }

        Ok(PaymentProof {
            order_id: present(self.razorpay_order_id)?,
            payment_id: present(self.razorpay_payment_id)?,
            signature: present(self.razorpay_signature)?,
        })
    }
}

/// A request whose fields have all been supplied
#[derive(Clone, PartialEq, Eq)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl std::fmt::Debug for PaymentProof {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentProof")
            .field("order_id", &self.order_id)
            .field("payment_id", &self.payment_id)
            .finish_non_exhaustive()
    }
}

/// Progress of a single verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStage {
    Pending,
    Validated,
    Authenticated,
    Recorded,
    Issued,
}

/// Terminal failure of a verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    MissingFields,
    BadSignature,
    StorageError,
}

impl Rejection {
    /// Classify an error into the terminal state it leads to
    pub fn from_error(err: &TallyError) -> Option<Self> {
        match err {
            TallyError::MissingFields => Some(Rejection::MissingFields),
            TallyError::InvalidSignature => Some(Rejection::BadSignature),
            TallyError::Storage(_) => Some(Rejection::StorageError),
            _ => None,
        }
    }
}

/// Successful verification result
#[derive(Debug, Clone, Serialize)]
pub struct VerificationReceipt {
    pub token: String,
    pub count: i64,
}

/// Runs the verification state machine
#[derive(Clone)]
pub struct PaymentVerifier {
    gateway: BoxedPaymentGateway,
    store: BoxedCounterStore,
    tokens: TokenIssuer,
}

impl PaymentVerifier {
    pub fn new(gateway: BoxedPaymentGateway, store: BoxedCounterStore, tokens: TokenIssuer) -> Self {
        Self {
            gateway,
            store,
            tokens,
        }
    }

    #[instrument(skip(self, request), fields(provider = self.gateway.provider_name()))]
    pub async fn verify(&self, request: VerificationRequest) -> TallyResult<VerificationReceipt> {
        let mut stage = VerificationStage::Pending;
        let result = self.advance(request, &mut stage).await;

        if let Err(ref err) = result {
            if let Some(rejection) = Rejection::from_error(err) {
                warn!(?stage, ?rejection, "Payment verification rejected");
            }
        }

        result
    }

    async fn advance(
        &self,
        request: VerificationRequest,
        stage: &mut VerificationStage,
    ) -> TallyResult<VerificationReceipt> {
        let proof = request.validate()?;
        *stage = VerificationStage::Validated;
        debug!(order_id = %proof.order_id, payment_id = %proof.payment_id, "Fields present");

        if !self
            .gateway
            .verify_payment(&proof.order_id, &proof.payment_id, &proof.signature)
        {
            return Err(TallyError::InvalidSignature);
        }
        *stage = VerificationStage::Authenticated;
        debug!("Signature authenticated");

        let count = self.store.increment_and_get().await?;
        *stage = VerificationStage::Recorded;
        debug!(count, backend = self.store.backend_name(), "Payment recorded");

        let token = self.tokens.issue()?;
        *stage = VerificationStage::Issued;
        debug!("Access token issued");

        info!(
            order_id = %proof.order_id,
            payment_id = %proof.payment_id,
            count,
            "Payment verified"
        );

        Ok(VerificationReceipt { token, count })
    }
}
