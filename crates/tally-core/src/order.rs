//! # Order Types
//!
//! Order request/response types exchanged with the payment gateway.
//! The order template is loaded from `config/order.toml` when present.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Template for orders created by `/create-order`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTemplate {
    /// Amount in smallest currency unit (paise for INR)
    #[serde(default = "default_amount")]
    pub amount: i64,

    /// ISO 4217 currency code
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Prefix for generated receipt identifiers
    #[serde(default = "default_receipt_prefix")]
    pub receipt_prefix: String,

    /// Capture payment automatically once authorized
    #[serde(default = "default_true")]
    pub payment_capture: bool,
}

fn default_amount() -> i64 {
    100 // ₹1
}

fn default_currency() -> String {
    "INR".to_string()
}

fn default_receipt_prefix() -> String {
    "receipt_".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for OrderTemplate {
    fn default() -> Self {
        Self {
            amount: default_amount(),
            currency: default_currency(),
            receipt_prefix: default_receipt_prefix(),
            payment_capture: true,
        }
    }
}

impl OrderTemplate {
    /// Load template from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Build a concrete order request stamped with `now`
    pub fn to_request(&self, now: DateTime<Utc>) -> OrderRequest {
        OrderRequest {
            amount: self.amount,
            currency: self.currency.clone(),
            receipt: format!("{}{}", self.receipt_prefix, now.timestamp_millis()),
            payment_capture: self.payment_capture,
        }
    }
}

/// Order creation request sent to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub payment_capture: bool,
}

/// Order object returned by the gateway.
///
/// Known fields are typed; anything else is kept in `extra` so the object
/// can be handed back to the client unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order ID (e.g. "order_EKwxwAgItmmXdp")
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    pub amount: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<i64>,

    pub currency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<i64>,

    /// Unix timestamp (seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_template() {
        let template = OrderTemplate::default();
        assert_eq!(template.amount, 100);
        assert_eq!(template.currency, "INR");
        assert!(template.payment_capture);
    }

    #[test]
    fn test_template_from_partial_toml() {
        let template = OrderTemplate::from_toml("amount = 500\n").unwrap();
        assert_eq!(template.amount, 500);
        assert_eq!(template.currency, "INR");
        assert_eq!(template.receipt_prefix, "receipt_");
    }

    #[test]
    fn test_receipt_uses_millis() {
        let now = DateTime::from_timestamp(1_700_000_000, 123_000_000).unwrap();
        let request = OrderTemplate::default().to_request(now);

        assert_eq!(request.receipt, "receipt_1700000000123");
        assert_eq!(request.amount, 100);
    }

    #[test]
    fn test_gateway_order_keeps_unknown_fields() {
        let raw = json!({
            "id": "order_IluGWxBm9U8zJ8",
            "entity": "order",
            "amount": 100,
            "amount_paid": 0,
            "amount_due": 100,
            "currency": "INR",
            "receipt": "receipt_1",
            "offer_id": null,
            "status": "created",
            "attempts": 0,
            "notes": [],
            "created_at": 1642662092
        });

        let order: GatewayOrder = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(order.id, "order_IluGWxBm9U8zJ8");
        assert_eq!(order.status.as_deref(), Some("created"));
        assert!(order.extra.contains_key("notes"));

        let echoed = serde_json::to_value(&order).unwrap();
        assert_eq!(echoed["notes"], raw["notes"]);
        assert_eq!(echoed["offer_id"], raw["offer_id"]);
        assert_eq!(echoed["created_at"], raw["created_at"]);
    }
}
