use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiscountType, PromoCode, PromoCodeCreate, PromoCodeUpdate};

use crate::api::{ApiResult, conflict_or_internal, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

fn check_code(code: &str) -> Result<(), AppError> {
    let code = code.trim();
    if code.is_empty() || code.len() > 32 {
        return Err(AppError::invalid_field("code", "Code must be 1-32 characters"));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(AppError::invalid_field("code", "Code may only contain letters, digits, dashes and underscores"));
    }
    Ok(())
}

fn check_discount(kind: DiscountType, value: Decimal) -> Result<(), AppError> {
    let valid = match kind {
        DiscountType::Percentage => value > Decimal::ZERO && value <= Decimal::ONE_HUNDRED,
        DiscountType::FixedAmount => value > Decimal::ZERO,
    };
    if !valid {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "discount_value"));
    }
    Ok(())
}

fn check_limits(
    min_order_amount: Option<Decimal>,
    max_uses: Option<i32>,
    valid_from: Option<i64>,
    valid_until: Option<i64>,
) -> Result<(), AppError> {
    if min_order_amount.is_some_and(|m| m < Decimal::ZERO) {
        return Err(AppError::invalid_field("min_order_amount", "Minimum order cannot be negative"));
    }
    if max_uses.is_some_and(|m| m < 1) {
        return Err(AppError::invalid_field("max_uses", "Must allow at least one use"));
    }
    if let (Some(from), Some(until)) = (valid_from, valid_until)
        && from >= until
    {
        return Err(AppError::invalid_field("valid_until", "Must be after valid_from"));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<PromoCode>> {
    let codes = db::promo_codes::list(&state.pool).await.map_err(internal)?;
    Ok(Json(codes))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<PromoCode> {
    let code = db::promo_codes::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PromoCodeNotFound))?;
    Ok(Json(code))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<PromoCodeCreate>,
) -> Result<(StatusCode, Json<PromoCode>), AppError> {
    check_code(&data.code)?;
    check_discount(data.discount_type, data.discount_value)?;
    check_limits(data.min_order_amount, data.max_uses, data.valid_from, data.valid_until)?;

    let code = db::promo_codes::create(&state.pool, &data)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::VoucherCodeExists))?;
    tracing::info!(promo_code = %code.code, "Promo code created");
    Ok((StatusCode::CREATED, Json(code)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<PromoCodeUpdate>,
) -> ApiResult<PromoCode> {
    let current = db::promo_codes::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PromoCodeNotFound))?;

    // Type and value are checked together, either may change alone
    check_discount(
        data.discount_type.unwrap_or(current.discount_type),
        data.discount_value.unwrap_or(current.discount_value),
    )?;
    check_limits(
        data.min_order_amount,
        data.max_uses,
        data.valid_from.or(current.valid_from),
        data.valid_until.or(current.valid_until),
    )?;

    let code = db::promo_codes::update(&state.pool, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PromoCodeNotFound))?;
    Ok(Json(code))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::promo_codes::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::PromoCodeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_capped() {
        assert!(check_discount(DiscountType::Percentage, Decimal::ONE_HUNDRED).is_ok());
        assert!(check_discount(DiscountType::Percentage, Decimal::new(1001, 1)).is_err());
        assert!(check_discount(DiscountType::Percentage, Decimal::ZERO).is_err());
        assert!(check_discount(DiscountType::FixedAmount, Decimal::new(500, 0)).is_ok());
        assert!(check_discount(DiscountType::FixedAmount, Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn code_charset() {
        assert!(check_code("SUMMER-25").is_ok());
        assert!(check_code("  ").is_err());
        assert!(check_code("50% OFF").is_err());
    }

    #[test]
    fn validity_window_is_ordered() {
        assert!(check_limits(None, None, Some(10), Some(20)).is_ok());
        assert!(check_limits(None, None, Some(20), Some(20)).is_err());
        assert!(check_limits(None, Some(0), None, None).is_err());
    }
}
