//! Stripe webhook handler
//!
//! POST /stripe/webhook: Stripe events, raw body for signature verification

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};

use crate::db::{self, BoxError};
use crate::services::challenge;
use crate::state::AppState;
use crate::stripe::CheckoutKind;

/// Handle incoming Stripe webhook events
///
/// Must receive raw body (not JSON) for HMAC signature verification.
pub async fn handle_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    let Some(sig_header) = headers.get("stripe-signature").and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Missing Stripe-Signature header");
        return StatusCode::BAD_REQUEST;
    };

    if let Err(e) = state.stripe.verify_webhook(&body, sig_header) {
        tracing::warn!(error = %e, "Webhook signature verification failed");
        return StatusCode::BAD_REQUEST;
    }

    let event: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(%e, "Failed to parse webhook JSON");
            return StatusCode::BAD_REQUEST;
        }
    };

    let event_type = event["type"].as_str().unwrap_or("");
    let Some(event_id) = event["id"].as_str() else {
        tracing::warn!("Webhook event missing id");
        return StatusCode::BAD_REQUEST;
    };
    tracing::info!(event_type = event_type, event_id = event_id, "Received Stripe webhook");

    // Idempotency: record first, so a redelivered event is skipped
    match db::webhook_events::record(&state.pool, event_id, event_type).await {
        Ok(false) => {
            tracing::info!(event_id = event_id, "Duplicate webhook event, skipping");
            return StatusCode::OK;
        }
        Ok(true) => {}
        Err(e) => {
            tracing::error!(%e, "DB error recording webhook event");
            return StatusCode::INTERNAL_SERVER_ERROR;
        }
    }

    let obj = &event["data"]["object"];
    let result = match event_type {
        "checkout.session.completed" | "checkout.session.async_payment_succeeded" => {
            handle_checkout_completed(&state, obj).await
        }
        "checkout.session.expired" | "checkout.session.async_payment_failed" => {
            tracing::info!(
                session_id = obj["id"].as_str().unwrap_or(""),
                kind = obj["metadata"]["kind"].as_str().unwrap_or(""),
                "Checkout session not paid"
            );
            Ok(())
        }
        _ => {
            tracing::debug!(event_type = event_type, "Unhandled webhook event type");
            Ok(())
        }
    };

    match result {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::error!(event_id = event_id, error = %e, "Webhook processing failed");
            // Let Stripe redeliver
            if let Err(e) = db::webhook_events::forget(&state.pool, event_id).await {
                tracing::error!(%e, "Failed to release webhook event");
            }
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn handle_checkout_completed(state: &AppState, obj: &serde_json::Value) -> Result<(), BoxError> {
    // Delayed payment methods complete the session before the money arrives
    if obj["payment_status"].as_str() == Some("unpaid") {
        tracing::info!(session_id = obj["id"].as_str().unwrap_or(""), "Checkout completed, payment pending");
        return Ok(());
    }

    let session_id = obj["id"].as_str().ok_or("checkout session without id")?;
    let kind = obj["metadata"]["kind"].as_str().and_then(CheckoutKind::parse);

    match kind {
        Some(CheckoutKind::GiftCard) => {
            match db::gift_cards::activate_by_session(&state.pool, session_id).await? {
                Some(card) => {
                    tracing::info!(gift_card_id = card.id, code = %card.code, "Gift card activated");
                    state.mailer.gift_card_activated(&card);
                }
                None => tracing::warn!(session_id = session_id, "No pending gift card for checkout session"),
            }
        }
        Some(CheckoutKind::Challenge) => {
            if challenge::fulfil_payment(state, session_id).await?.is_none() {
                tracing::warn!(session_id = session_id, "No unpaid challenge for checkout session");
            }
        }
        None => {
            tracing::warn!(session_id = session_id, "Checkout session without known metadata kind");
        }
    }
    Ok(())
}
