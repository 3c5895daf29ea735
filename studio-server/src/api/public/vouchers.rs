//! Promo code quotes and the gift card shop

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{CheckoutRedirect, GiftCardBalance, GiftCardPurchase, GiftCardStatus, PromoValidateRequest};
use shared::pricing::{self, Quote};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::services::booking::{bookable_service_type, resolve_vouchers};
use crate::services::checkout;
use crate::state::AppState;

/// POST /api/promo-codes/validate
///
/// Prices the package with the promo code (and optional gift card) applied.
pub async fn validate_promo_code(
    State(state): State<AppState>,
    Json(req): Json<PromoValidateRequest>,
) -> ApiResult<Quote> {
    let service = bookable_service_type(&state.pool, req.service_type_id).await?;
    let (promo, gift_card) = resolve_vouchers(&state.pool, Some(&req.code), req.gift_card_code.as_deref()).await?;
    if promo.is_none() {
        return Err(AppError::invalid_field("code", "Promo code is required"));
    }
    let quote = pricing::quote(service.price, promo.as_ref(), gift_card.as_ref(), shared::util::now_millis())?;
    Ok(Json(quote))
}

/// GET /api/gift-cards/{code}
pub async fn gift_card_balance(State(state): State<AppState>, Path(code): Path<String>) -> ApiResult<GiftCardBalance> {
    let card = db::gift_cards::find_by_code(&state.pool, &code)
        .await
        .map_err(internal)?
        .filter(|c| c.status != GiftCardStatus::PendingPayment)
        .ok_or_else(|| AppError::new(ErrorCode::GiftCardNotFound))?;
    Ok(Json(GiftCardBalance::from(&card)))
}

/// POST /api/gift-cards/purchase
pub async fn purchase_gift_card(
    State(state): State<AppState>,
    Json(req): Json<GiftCardPurchase>,
) -> Result<(StatusCode, Json<CheckoutRedirect>), AppError> {
    let redirect = checkout::purchase_gift_card(&state, &req).await?;
    Ok((StatusCode::CREATED, Json(redirect)))
}
