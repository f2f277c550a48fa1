//! # Payment Signatures
//!
//! Razorpay signs a completed checkout with
//! `hex(HMAC-SHA256(key_secret, order_id + "|" + payment_id))`.
//! The client forwards that value to `/verify`, where it is recomputed here.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the expected signature for an order/payment pair
pub fn payment_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Check a client-supplied signature.
///
/// The comparison is exact (lowercase hex) and constant-time.
pub fn verify_payment_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature: &str,
) -> bool {
    let expected = payment_signature(secret, order_id, payment_id);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
