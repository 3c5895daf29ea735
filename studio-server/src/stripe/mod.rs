//! Stripe integration via REST API (no SDK dependency)

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::db::BoxError;

const CHECKOUT_SESSIONS_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Signed webhook events older than this are rejected
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

/// What a checkout session pays for, carried in `metadata[kind]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutKind {
    GiftCard,
    Challenge,
}

impl CheckoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutKind::GiftCard => "gift_card",
            CheckoutKind::Challenge => "challenge",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gift_card" => Some(CheckoutKind::GiftCard),
            "challenge" => Some(CheckoutKind::Challenge),
            _ => None,
        }
    }
}

/// One-off payment for a single line item
#[derive(Debug, Clone)]
pub struct CheckoutRequest<'a> {
    /// Amount in minor units (grosze / cents)
    pub amount_minor: i64,
    pub currency: &'a str,
    pub product_name: &'a str,
    pub customer_email: &'a str,
    pub kind: CheckoutKind,
    /// Local record id the session pays for
    pub reference: i64,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(secret_key: String, webhook_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            webhook_secret,
        }
    }

    /// Create a Stripe Checkout Session (payment mode)
    pub async fn create_checkout_session(&self, req: &CheckoutRequest<'_>) -> Result<CheckoutSession, BoxError> {
        let amount = req.amount_minor.to_string();
        let reference = req.reference.to_string();

        let resp: serde_json::Value = self
            .http
            .post(CHECKOUT_SESSIONS_URL)
            .basic_auth(&self.secret_key, None::<&str>)
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .form(&[
                ("mode", "payment"),
                ("customer_email", req.customer_email),
                ("line_items[0][quantity]", "1"),
                ("line_items[0][price_data][currency]", req.currency),
                ("line_items[0][price_data][unit_amount]", amount.as_str()),
                ("line_items[0][price_data][product_data][name]", req.product_name),
                ("success_url", req.success_url),
                ("cancel_url", req.cancel_url),
                ("client_reference_id", reference.as_str()),
                ("metadata[kind]", req.kind.as_str()),
                ("metadata[reference]", reference.as_str()),
            ])
            .send()
            .await?
            .json()
            .await?;

        match (resp["id"].as_str(), resp["url"].as_str()) {
            (Some(id), Some(url)) => Ok(CheckoutSession {
                id: id.to_string(),
                url: url.to_string(),
            }),
            _ => Err(format!("Stripe create_checkout failed: {}", resp["error"]).into()),
        }
    }

    pub fn verify_webhook(&self, payload: &[u8], sig_header: &str) -> Result<(), WebhookError> {
        verify_webhook_signature(payload, sig_header, &self.webhook_secret, chrono::Utc::now().timestamp())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("invalid Stripe-Signature header")]
    MalformedHeader,
    #[error("invalid signature hex")]
    InvalidHex,
    #[error("invalid timestamp")]
    InvalidTimestamp,
    #[error("webhook signature mismatch")]
    Mismatch,
    #[error("webhook timestamp outside tolerance")]
    Stale,
}

/// Verify Stripe webhook signature (HMAC-SHA256 over `"{t}.{payload}"`).
///
/// The header may carry several `v1=` entries during secret rotation; any
/// match is accepted.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), WebhookError> {
    let mut timestamp = "";
    let mut signatures = Vec::new();
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signatures.push(v);
        }
    }

    if timestamp.is_empty() || signatures.is_empty() {
        return Err(WebhookError::MalformedHeader);
    }

    let ts: i64 = timestamp.parse().map_err(|_| WebhookError::InvalidTimestamp)?;

    let mut matched = false;
    for signature in signatures {
        let sig_bytes = hex::decode(signature).map_err(|_| WebhookError::InvalidHex)?;
        let mut mac =
            Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| WebhookError::Mismatch)?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        if mac.verify_slice(&sig_bytes).is_ok() {
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(WebhookError::Mismatch);
    }

    if (now_secs - ts).abs() > WEBHOOK_TOLERANCE_SECS {
        return Err(WebhookError::Stale);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const PAYLOAD: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed"}"#;

    fn sign(ts: i64, payload: &[u8], secret: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{ts}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn accepts_valid_signature() {
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(ts, PAYLOAD, SECRET));
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, ts + 10), Ok(()));
    }

    #[test]
    fn accepts_any_rotated_signature() {
        let ts = 1_700_000_000;
        let header = format!(
            "t={ts}, v1={}, v1={}",
            sign(ts, PAYLOAD, "whsec_old"),
            sign(ts, PAYLOAD, SECRET)
        );
        assert_eq!(verify_webhook_signature(PAYLOAD, &header, SECRET, ts), Ok(()));
    }

    #[test]
    fn rejects_tampered_payload() {
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(ts, PAYLOAD, SECRET));
        let err = verify_webhook_signature(b"{}", &header, SECRET, ts).unwrap_err();
        assert_eq!(err, WebhookError::Mismatch);
    }

    #[test]
    fn rejects_stale_event() {
        let ts = 1_700_000_000;
        let header = format!("t={ts},v1={}", sign(ts, PAYLOAD, SECRET));
        let err = verify_webhook_signature(PAYLOAD, &header, SECRET, ts + WEBHOOK_TOLERANCE_SECS + 1).unwrap_err();
        assert_eq!(err, WebhookError::Stale);
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(
            verify_webhook_signature(PAYLOAD, "v1=abcd", SECRET, 0),
            Err(WebhookError::MalformedHeader)
        );
        assert_eq!(
            verify_webhook_signature(PAYLOAD, "t=1,v1=zz", SECRET, 1),
            Err(WebhookError::InvalidHex)
        );
        assert_eq!(
            verify_webhook_signature(PAYLOAD, "t=soon,v1=00", SECRET, 1),
            Err(WebhookError::InvalidTimestamp)
        );
    }

    #[test]
    fn checkout_kind_names() {
        for kind in [CheckoutKind::GiftCard, CheckoutKind::Challenge] {
            assert_eq!(CheckoutKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(CheckoutKind::parse("subscription"), None);
    }
}
