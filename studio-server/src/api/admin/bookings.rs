use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Booking, BookingQuery, BookingStatusUpdate, BookingUpdate};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

pub async fn list(State(state): State<AppState>, Query(query): Query<BookingQuery>) -> ApiResult<Vec<Booking>> {
    for (field, value) in [("from", &query.from), ("to", &query.to)] {
        if let Some(date) = value {
            shared::availability::parse_date(date).map_err(|_| AppError::invalid_field(field, "Expected YYYY-MM-DD"))?;
        }
    }
    let bookings = db::bookings::list(&state.pool, &query).await.map_err(internal)?;
    Ok(Json(bookings))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Booking> {
    let booking = db::bookings::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    Ok(Json(booking))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<BookingUpdate>,
) -> ApiResult<Booking> {
    if let Some(email) = &data.client_email
        && !shared::util::is_valid_email(email)
    {
        return Err(AppError::invalid_field("client_email", "Invalid email address"));
    }
    if data.client_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::invalid_field("client_name", "Name is required"));
    }
    let booking = db::bookings::update(&state.pool, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;
    Ok(Json(booking))
}

/// PUT /api/admin/bookings/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<BookingStatusUpdate>,
) -> ApiResult<Booking> {
    let current = db::bookings::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::BookingNotFound))?;

    if current.status == req.status {
        return Ok(Json(current));
    }
    let invalid = || {
        AppError::new(ErrorCode::BookingInvalidStatus)
            .with_detail("from", current.status.as_str())
            .with_detail("to", req.status.as_str())
    };
    if !current.status.can_transition_to(req.status) {
        return Err(invalid());
    }

    let booking = db::bookings::update_status(&state.pool, id, current.status, req.status)
        .await
        .map_err(internal)?
        .ok_or_else(invalid)?;

    tracing::info!(
        booking_id = id,
        from = current.status.as_str(),
        to = booking.status.as_str(),
        "Booking status changed"
    );

    let service_name = match db::service_types::get(&state.pool, booking.service_type_id).await {
        Ok(Some(s)) => s.name,
        _ => "photo session".to_string(),
    };
    state.mailer.booking_status_changed(&booking, &service_name);
    Ok(Json(booking))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::bookings::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::BookingNotFound)
}
