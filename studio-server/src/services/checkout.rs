//! Paid storefront flows: gift card purchase and sending a photo challenge

use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    CheckoutRedirect, GiftCardPurchase, PhotoChallenge, PhotoChallengeCreate, KEY_CHALLENGE_DISCOUNT,
};
use shared::pricing;
use shared::util::{generate_token, generate_voucher_code, is_valid_email, now_millis};

use crate::db::{self, BoxError};
use crate::error::{ServiceError, ServiceResult};
use crate::state::AppState;
use crate::stripe::{CheckoutKind, CheckoutRequest};

use super::booking::bookable_service_type;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Storefront gift card bounds
pub const GIFT_CARD_MIN_AMOUNT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
pub const GIFT_CARD_MAX_AMOUNT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Recipient discount when `challenge.discount_percent` is not configured
pub const DEFAULT_CHALLENGE_DISCOUNT: i32 = 20;

/// Voucher codes are random; a collision is retried a few times
const CODE_ATTEMPTS: usize = 3;

fn validate_gift_card_purchase(req: &GiftCardPurchase) -> Result<(), AppError> {
    if req.amount < GIFT_CARD_MIN_AMOUNT || req.amount > GIFT_CARD_MAX_AMOUNT {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Gift card amount must be between {GIFT_CARD_MIN_AMOUNT} and {GIFT_CARD_MAX_AMOUNT}"),
        )
        .with_detail("field", "amount"));
    }
    if req.amount.round_dp(2) != req.amount {
        return Err(AppError::invalid_field("amount", "At most two decimal places"));
    }
    if req.purchaser_name.trim().is_empty() {
        return Err(AppError::invalid_field("purchaser_name", "Name is required"));
    }
    if !is_valid_email(&req.purchaser_email) {
        return Err(AppError::invalid_field("purchaser_email", "Invalid email address"));
    }
    if let Some(email) = &req.recipient_email
        && !is_valid_email(email)
    {
        return Err(AppError::invalid_field("recipient_email", "Invalid email address"));
    }
    Ok(())
}

fn validate_challenge(req: &PhotoChallengeCreate) -> Result<(), AppError> {
    if req.sender_name.trim().is_empty() {
        return Err(AppError::invalid_field("sender_name", "Name is required"));
    }
    if req.recipient_name.trim().is_empty() {
        return Err(AppError::invalid_field("recipient_name", "Name is required"));
    }
    if !is_valid_email(&req.sender_email) {
        return Err(AppError::invalid_field("sender_email", "Invalid email address"));
    }
    if !is_valid_email(&req.recipient_email) {
        return Err(AppError::invalid_field("recipient_email", "Invalid email address"));
    }
    if req.sender_email.trim().eq_ignore_ascii_case(req.recipient_email.trim()) {
        return Err(AppError::invalid_field("recipient_email", "You cannot challenge yourself"));
    }
    Ok(())
}

/// Amount the sender pays: the part of the session price gifted to the recipient.
pub fn challenge_fee(price: Decimal, discount_percent: i32) -> Decimal {
    price - pricing::challenge_price(price, discount_percent)
}

fn payment_setup_failed(e: BoxError) -> ServiceError {
    tracing::error!(error = %e, "Stripe checkout session creation failed");
    AppError::new(ErrorCode::PaymentSetupFailed).into()
}

/// Create a `pending_payment` gift card and its Stripe checkout.
pub async fn purchase_gift_card(state: &AppState, req: &GiftCardPurchase) -> ServiceResult<CheckoutRedirect> {
    validate_gift_card_purchase(req)?;
    let amount_minor = pricing::to_minor_units(req.amount)?;
    let expires_at = now_millis() + state.gift_card_validity_days * MS_PER_DAY;

    let mut attempt = 0;
    let card = loop {
        attempt += 1;
        let code = generate_voucher_code("GC");
        match db::gift_cards::create_pending(&state.pool, req, &code, expires_at).await {
            Ok(card) => break card,
            Err(e) if db::is_unique_violation(&e) && attempt < CODE_ATTEMPTS => {
                tracing::warn!(attempt, "Gift card code collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    };

    let (success_url, cancel_url) = state.checkout_urls("/gift-cards");
    let product_name = format!("Gift card {}", card.code);
    let session = state
        .stripe
        .create_checkout_session(&CheckoutRequest {
            amount_minor,
            currency: &state.currency,
            product_name: &product_name,
            customer_email: &card.purchaser_email,
            kind: CheckoutKind::GiftCard,
            reference: card.id,
            success_url: &success_url,
            cancel_url: &cancel_url,
        })
        .await
        .map_err(payment_setup_failed)?;

    db::gift_cards::set_payment_session(&state.pool, card.id, &session.id).await?;

    tracing::info!(gift_card_id = card.id, amount = %card.initial_amount, "Gift card checkout started");
    Ok(CheckoutRedirect {
        id: card.id,
        checkout_url: session.url,
    })
}

/// Create a challenge and the sender's checkout. With nothing to pay the
/// invitation goes out immediately and the redirect points at the
/// confirmation page.
pub async fn send_challenge(state: &AppState, req: &PhotoChallengeCreate) -> ServiceResult<CheckoutRedirect> {
    validate_challenge(req)?;
    let service = bookable_service_type(&state.pool, req.service_type_id).await?;

    let discount_percent = db::settings::get_typed::<i32>(&state.pool, KEY_CHALLENGE_DISCOUNT)
        .await?
        .unwrap_or(DEFAULT_CHALLENGE_DISCOUNT)
        .clamp(0, 100);
    let fee = challenge_fee(service.price, discount_percent);
    let expires_at = now_millis() + state.challenge_validity_days * MS_PER_DAY;

    let challenge = db::challenges::create(&state.pool, req, &generate_token(), discount_percent, expires_at).await?;

    if fee <= Decimal::ZERO {
        if let Some(paid) = db::challenges::mark_paid(&state.pool, challenge.id).await? {
            state.mailer.challenge_invitation(&paid, &service.name);
        }
        tracing::info!(challenge_id = challenge.id, "Free photo challenge sent");
        return Ok(CheckoutRedirect {
            id: challenge.id,
            checkout_url: format!("{}/challenge/sent?status=success", state.public_base_url),
        });
    }

    let (success_url, cancel_url) = state.checkout_urls("/challenge/sent");
    let product_name = format!("Photo challenge for {}", challenge.recipient_name);
    let session = state
        .stripe
        .create_checkout_session(&CheckoutRequest {
            amount_minor: pricing::to_minor_units(fee)?,
            currency: &state.currency,
            product_name: &product_name,
            customer_email: &challenge.sender_email,
            kind: CheckoutKind::Challenge,
            reference: challenge.id,
            success_url: &success_url,
            cancel_url: &cancel_url,
        })
        .await
        .map_err(payment_setup_failed)?;

    db::challenges::set_payment_session(&state.pool, challenge.id, &session.id).await?;

    tracing::info!(challenge_id = challenge.id, fee = %fee, "Photo challenge checkout started");
    Ok(CheckoutRedirect {
        id: challenge.id,
        checkout_url: session.url,
    })
}

/// Name of the challenge's service type for emails; falls back to a generic label.
pub async fn service_name(state: &AppState, challenge: &PhotoChallenge) -> String {
    match db::service_types::get(&state.pool, challenge.service_type_id).await {
        Ok(Some(service)) => service.name,
        Ok(None) => "photo session".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Service type lookup failed");
            "photo session".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase(amount: &str) -> GiftCardPurchase {
        GiftCardPurchase {
            amount: amount.parse().unwrap(),
            purchaser_name: "Marek".into(),
            purchaser_email: "marek@example.com".into(),
            recipient_name: Some("Ania".into()),
            recipient_email: Some("ania@example.com".into()),
            message: None,
        }
    }

    #[test]
    fn gift_card_amount_bounds() {
        assert!(validate_gift_card_purchase(&purchase("250")).is_ok());
        assert!(validate_gift_card_purchase(&purchase("50")).is_ok());
        assert_eq!(
            validate_gift_card_purchase(&purchase("49.99")).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate_gift_card_purchase(&purchase("10000.01")).unwrap_err().code,
            ErrorCode::ValueOutOfRange
        );
        assert_eq!(
            validate_gift_card_purchase(&purchase("100.005")).unwrap_err().code,
            ErrorCode::ValidationFailed
        );
    }

    #[test]
    fn gift_card_recipient_email_checked() {
        let mut req = purchase("100");
        req.recipient_email = Some("not-an-email".into());
        let err = validate_gift_card_purchase(&req).unwrap_err();
        assert_eq!(err.details.unwrap()["field"], "recipient_email");
    }

    #[test]
    fn cannot_challenge_yourself() {
        let req = PhotoChallengeCreate {
            sender_name: "Kasia".into(),
            sender_email: "Kasia@Example.com".into(),
            recipient_name: "Kasia".into(),
            recipient_email: "kasia@example.com".into(),
            message: None,
            service_type_id: 1,
        };
        assert!(validate_challenge(&req).is_err());
    }

    #[test]
    fn sender_pays_the_gifted_part() {
        let price: Decimal = "300".parse().unwrap();
        assert_eq!(challenge_fee(price, 20), "60".parse::<Decimal>().unwrap());
        assert_eq!(challenge_fee(price, 0), Decimal::ZERO);
        assert_eq!(challenge_fee(price, 100), price);
    }

    #[test]
    fn gift_card_bounds_are_whole_amounts() {
        assert_eq!(GIFT_CARD_MIN_AMOUNT.to_string(), "50");
        assert_eq!(GIFT_CARD_MAX_AMOUNT.to_string(), "10000");
    }
}
