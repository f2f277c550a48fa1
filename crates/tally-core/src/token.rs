//! # Access Tokens
//!
//! Signed, time-bounded credentials handed out after a verified payment.
//! Tokens are HS256 JWTs; the server keeps only the signing secret, so a
//! token stays valid until it expires.

use crate::error::{TallyError, TallyResult};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Holder completed a verified payment
    pub paid: bool,
    /// Issued at (seconds since epoch)
    pub iat: i64,
    /// Expires at (seconds since epoch)
    pub exp: i64,
}

/// Issues and validates access tokens with a process-wide secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenIssuer {
    /// Tokens are valid for 7 days unless configured otherwise
    pub const DEFAULT_VALIDITY_DAYS: i64 = 7;

    /// Create an issuer from the signing secret.
    ///
    /// An empty secret is rejected; there is no fallback secret. The validity
    /// must be positive and small enough that an expiry can be computed.
    pub fn new(secret: &str, validity: Duration) -> TallyResult<Self> {
        if secret.is_empty() {
            return Err(TallyError::Configuration(
                "token signing secret must not be empty".to_string(),
            ));
        }
        if validity <= Duration::zero() {
            return Err(TallyError::Configuration(
                "token validity must be positive".to_string(),
            ));
        }
        if Utc::now().checked_add_signed(validity).is_none() {
            return Err(TallyError::Configuration(format!(
                "token validity of {} days is out of range",
                validity.num_days()
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validity,
        })
    }

    /// Create an issuer with the default 7-day validity window
    pub fn with_default_validity(secret: &str) -> TallyResult<Self> {
        Self::new(secret, Duration::days(Self::DEFAULT_VALIDITY_DAYS))
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a token for a verified payment, stamped now
    pub fn issue(&self) -> TallyResult<String> {
        self.issue_at(Utc::now())
    }

    /// Issue a token whose validity window starts at `issued_at`
    pub fn issue_at(&self, issued_at: DateTime<Utc>) -> TallyResult<String> {
        let expires_at = issued_at
            .checked_add_signed(self.validity)
            .ok_or_else(|| TallyError::Internal("Token expiry out of range".to_string()))?;

        let claims = AccessClaims {
            paid: true,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TallyError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the embedded claims
    pub fn validate(&self, token: &str) -> TallyResult<AccessClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => debug!("Token expired"),
                ErrorKind::InvalidSignature => debug!("Token signature mismatch"),
                _ => debug!("Token rejected: {}", e),
            }
            TallyError::Unauthorized
        })?;

        if !data.claims.paid {
            return Err(TallyError::Unauthorized);
        }

        Ok(data.claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
