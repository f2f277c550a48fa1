//! # Application State
//!
//! Shared state for the Axum application.
//! Contains the payment gateway, counter store, token issuer and order template.

use chrono::Duration;
use std::net::SocketAddr;
use std::sync::Arc;
use tally_core::{
    BoxedCounterStore, BoxedPaymentGateway, OrderTemplate, PaymentVerifier, TokenIssuer,
};
use tally_razorpay::RazorpayGateway;
use tally_store::StoreConfig;

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Access token signing secret
    pub jwt_secret: String,
    /// Lifetime of issued access tokens
    pub token_validity_days: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("environment", &self.environment)
            .field("jwt_secret", &"<redacted>")
            .field("token_validity_days", &self.token_validity_days)
            .finish()
    }
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET not set"))?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid PORT: {}", raw))?,
            None => 4000,
        };

        let token_validity_days = match lookup("TOKEN_VALIDITY_DAYS") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid TOKEN_VALIDITY_DAYS: {}", raw))?,
            None => TokenIssuer::DEFAULT_VALIDITY_DAYS,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            jwt_secret,
            token_validity_days,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Token issuer built from the secret and validity
    pub fn token_issuer(&self) -> anyhow::Result<TokenIssuer> {
        let validity = Duration::try_days(self.token_validity_days).ok_or_else(|| {
            anyhow::anyhow!(
                "TOKEN_VALIDITY_DAYS out of range: {}",
                self.token_validity_days
            )
        })?;
        TokenIssuer::new(&self.jwt_secret, validity)
            .map_err(|e| anyhow::anyhow!("Failed to initialize tokens: {}", e))
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment gateway (orders + signature checks)
    pub gateway: BoxedPaymentGateway,
    /// Persisted payment counter
    pub store: BoxedCounterStore,
    /// Access token issuer/validator
    pub tokens: TokenIssuer,
    /// Verification state machine
    pub verifier: PaymentVerifier,
    /// Order parameters sent on every create-order call
    pub order_template: Arc<OrderTemplate>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState with the Razorpay gateway and the configured store
    pub async fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let tokens = config.token_issuer()?;

        let gateway = RazorpayGateway::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Razorpay: {}", e))?;

        let store_config = StoreConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Invalid store configuration: {}", e))?;
        let store = tally_store::connect(&store_config)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize counter store: {}", e))?;

        let order_template = load_order_template()?;

        Ok(Self::from_parts(
            Arc::new(gateway),
            store,
            tokens,
            order_template,
            config,
        ))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        gateway: BoxedPaymentGateway,
        store: BoxedCounterStore,
        tokens: TokenIssuer,
        order_template: OrderTemplate,
        config: AppConfig,
    ) -> Self {
        let verifier = PaymentVerifier::new(gateway.clone(), store.clone(), tokens.clone());

        Self {
            gateway,
            store,
            tokens,
            verifier,
            order_template: Arc::new(order_template),
            config,
        }
    }
}

/// Load the order template from config file
fn load_order_template() -> anyhow::Result<OrderTemplate> {
    let config_paths = [
        "config/order.toml",
        "../config/order.toml",
        "../../config/order.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let template = OrderTemplate::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!(
                "Loaded order template from {}: {} {}",
                path,
                template.amount,
                template.currency
            );
            return Ok(template);
        }
    }

    tracing::warn!("No order config found, using default order template");
    Ok(OrderTemplate::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("JWT_SECRET", "jwt-secret")]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.token_validity_days, 7);
        assert!(!config.is_production());
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:4000");
    }

    #[test]
    fn test_jwt_secret_required() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn test_invalid_port() {
        assert!(config(&[("JWT_SECRET", "x"), ("PORT", "http")]).is_err());
    }

    #[test]
    fn test_invalid_host_is_error() {
        let config = config(&[("JWT_SECRET", "x"), ("HOST", "not a host")]).unwrap();
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_token_validity_out_of_range() {
        let huge = config(&[("JWT_SECRET", "x"), ("TOKEN_VALIDITY_DAYS", "900000000000")]).unwrap();
        assert!(huge.token_issuer().is_err());

        let far = config(&[("JWT_SECRET", "x"), ("TOKEN_VALIDITY_DAYS", "100000000")]).unwrap();
        assert!(far.token_issuer().is_err());

        let zero = config(&[("JWT_SECRET", "x"), ("TOKEN_VALIDITY_DAYS", "0")]).unwrap();
        assert!(zero.token_issuer().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = config(&[("JWT_SECRET", "hunter2")]).unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
