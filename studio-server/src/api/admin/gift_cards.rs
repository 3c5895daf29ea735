use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{GiftCard, GiftCardCreate, GiftCardUpdate};
use shared::util::{generate_voucher_code, is_valid_email, normalize_code, now_millis};

use crate::api::{ApiResult, conflict_or_internal, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

fn check_create(data: &GiftCardCreate) -> Result<(), AppError> {
    if data.amount <= Decimal::ZERO {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "amount"));
    }
    if data.purchaser_name.trim().is_empty() {
        return Err(AppError::invalid_field("purchaser_name", "Name is required"));
    }
    if !is_valid_email(&data.purchaser_email) {
        return Err(AppError::invalid_field("purchaser_email", "Invalid email address"));
    }
    if let Some(email) = &data.recipient_email
        && !is_valid_email(email)
    {
        return Err(AppError::invalid_field("recipient_email", "Invalid email address"));
    }
    if let Some(code) = &data.code {
        let code = code.trim();
        if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(AppError::invalid_field("code", "Code may only contain letters, digits and dashes"));
        }
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<GiftCard>> {
    let cards = db::gift_cards::list(&state.pool).await.map_err(internal)?;
    Ok(Json(cards))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<GiftCard> {
    let card = db::gift_cards::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::GiftCardNotFound))?;
    Ok(Json(card))
}

/// Issue a card sold outside the storefront; it is active at once.
pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<GiftCardCreate>,
) -> Result<(StatusCode, Json<GiftCard>), AppError> {
    check_create(&data)?;
    let now = now_millis();
    let expires_at = data
        .expires_at
        .unwrap_or(now + state.gift_card_validity_days * MS_PER_DAY);
    if expires_at <= now {
        return Err(AppError::invalid_field("expires_at", "Expiry must be in the future"));
    }

    let code = match &data.code {
        Some(code) => normalize_code(code),
        None => generate_voucher_code("GC"),
    };
    let card = db::gift_cards::create_issued(&state.pool, &data, &code, expires_at)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::VoucherCodeExists))?;

    tracing::info!(gift_card_id = card.id, amount = %card.initial_amount, "Gift card issued");
    Ok((StatusCode::CREATED, Json(card)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<GiftCardUpdate>,
) -> ApiResult<GiftCard> {
    if data.balance.is_some_and(|b| b < Decimal::ZERO) {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "balance"));
    }
    if let Some(email) = &data.recipient_email
        && !is_valid_email(email)
    {
        return Err(AppError::invalid_field("recipient_email", "Invalid email address"));
    }
    let card = db::gift_cards::update(&state.pool, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::GiftCardNotFound))?;
    Ok(Json(card))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::gift_cards::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::GiftCardNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(amount: i64, code: Option<&str>) -> GiftCardCreate {
        GiftCardCreate {
            amount: Decimal::new(amount, 0),
            code: code.map(Into::into),
            purchaser_name: "Front desk".into(),
            purchaser_email: "studio@example.com".into(),
            recipient_name: None,
            recipient_email: None,
            message: None,
            expires_at: None,
        }
    }

    #[test]
    fn issued_amount_must_be_positive() {
        assert!(check_create(&issue(200, None)).is_ok());
        assert_eq!(check_create(&issue(0, None)).unwrap_err().code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn custom_code_charset() {
        assert!(check_create(&issue(100, Some("xmas-2026"))).is_ok());
        assert!(check_create(&issue(100, Some("xmas 2026"))).is_err());
    }
}
