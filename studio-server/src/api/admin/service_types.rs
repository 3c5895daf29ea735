use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use shared::availability::{MAX_SESSION_HOURS, MIN_SESSION_HOURS};
use shared::error::{AppError, ErrorCode};
use shared::models::{ServiceKind, ServiceType, ServiceTypeCreate, ServiceTypeUpdate};
use shared::util::is_valid_slug;

use crate::api::{ApiResult, conflict_or_internal, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

fn check_fields(
    slug: Option<&str>,
    price: Option<Decimal>,
    kind: Option<ServiceKind>,
    duration_hours: Option<i32>,
) -> Result<(), AppError> {
    if let Some(slug) = slug
        && !is_valid_slug(slug)
    {
        return Err(AppError::invalid_field("slug", "Slug may only contain lowercase letters, digits and dashes"));
    }
    if price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::invalid_field("price", "Price cannot be negative"));
    }
    let session = kind.is_none_or(|k| !k.blocks_whole_day());
    if session
        && let Some(hours) = duration_hours
        && !(MIN_SESSION_HOURS as i32..=MAX_SESSION_HOURS as i32).contains(&hours)
    {
        return Err(AppError::new(ErrorCode::InvalidDuration).with_detail("field", "duration_hours"));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ServiceType>> {
    let types = db::service_types::list(&state.pool, false).await.map_err(internal)?;
    Ok(Json(types))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<ServiceType> {
    let service = db::service_types::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ServiceTypeNotFound))?;
    Ok(Json(service))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<ServiceTypeCreate>,
) -> Result<(StatusCode, Json<ServiceType>), AppError> {
    if data.name.trim().is_empty() {
        return Err(AppError::invalid_field("name", "Name is required"));
    }
    check_fields(Some(&data.slug), Some(data.price), Some(data.kind), data.duration_hours)?;
    let service = db::service_types::create(&state.pool, &data)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::AlreadyExists))?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<ServiceTypeUpdate>,
) -> ApiResult<ServiceType> {
    check_fields(data.slug.as_deref(), data.price, data.kind, data.duration_hours)?;
    let service = db::service_types::update(&state.pool, id, &data)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::AlreadyExists))?
        .ok_or_else(|| AppError::new(ErrorCode::ServiceTypeNotFound))?;
    Ok(Json(service))
}

/// Types with bookings or challenges are deactivated instead of removed.
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::service_types::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::ServiceTypeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_duration_is_bounded() {
        assert!(check_fields(None, None, Some(ServiceKind::Session), Some(2)).is_ok());
        assert_eq!(
            check_fields(None, None, Some(ServiceKind::Session), Some(3)).unwrap_err().code,
            ErrorCode::InvalidDuration
        );
        // Whole-day packages ignore the duration
        assert!(check_fields(None, None, Some(ServiceKind::Wedding), Some(8)).is_ok());
    }

    #[test]
    fn slug_and_price_are_checked() {
        assert!(check_fields(Some("Bad Slug"), None, None, None).is_err());
        assert!(check_fields(None, Some(Decimal::NEGATIVE_ONE), None, None).is_err());
        assert!(check_fields(Some("family-session"), Some(Decimal::ONE_HUNDRED), None, None).is_ok());
    }
}
