//! # Razorpay Configuration
//!
//! Configuration management for the Razorpay integration.
//! All secrets are loaded from environment variables.

use std::env;
use std::time::Duration;
use tally_core::TallyError;

/// Default timeout for a single Razorpay API call
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const DEFAULT_API_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay API configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Key ID (rzp_test_... or rzp_live_...)
    pub key_id: String,

    /// Key secret; also the HMAC key for payment signatures
    pub key_secret: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,

    /// Timeout applied to every API call
    pub request_timeout: Duration,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl RazorpayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `RAZORPAY_KEY_ID`
    /// - `RAZORPAY_KEY_SECRET`
    ///
    /// Optional:
    /// - `RAZORPAY_API_BASE_URL`
    /// - `RAZORPAY_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, TallyError> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TallyError> {
        let key_id = lookup("RAZORPAY_KEY_ID")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| TallyError::Configuration("RAZORPAY_KEY_ID not set".to_string()))?;

        let key_secret = lookup("RAZORPAY_KEY_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                TallyError::Configuration("RAZORPAY_KEY_SECRET not set".to_string())
            })?;

        // Validate key format
        if !key_id.starts_with("rzp_test_") && !key_id.starts_with("rzp_live_") {
            return Err(TallyError::Configuration(
                "RAZORPAY_KEY_ID must start with rzp_test_ or rzp_live_".to_string(),
            ));
        }

        let timeout_secs = match lookup("RAZORPAY_TIMEOUT_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                TallyError::Configuration(format!("Invalid RAZORPAY_TIMEOUT_SECS: {}", raw))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let mut config = Self::new(key_id, key_secret);
        config.request_timeout = Duration::from_secs(timeout_secs);
        if let Some(url) = lookup("RAZORPAY_API_BASE_URL") {
            config.api_base_url = url;
        }

        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Check if using test keys
    pub fn is_test_mode(&self) -> bool {
        self.key_id.starts_with("rzp_test_")
    }

    /// Check if using live keys
    pub fn is_live_mode(&self) -> bool {
        self.key_id.starts_with("rzp_live_")
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builder: set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
