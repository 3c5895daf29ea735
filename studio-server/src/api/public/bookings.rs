//! Public booking form

use axum::{Json, extract::State, http::StatusCode};
use shared::error::AppError;
use shared::models::{Booking, BookingCreate};

use crate::services::booking::{BookingDraft, place_booking};
use crate::state::AppState;

/// POST /api/bookings
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<BookingCreate>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = place_booking(
        &state,
        &BookingDraft {
            service_type_id: req.service_type_id,
            date: &req.date,
            start_time: req.start_time.as_deref(),
            duration_hours: req.duration_hours,
            client_name: &req.client_name,
            client_email: &req.client_email,
            client_phone: req.client_phone.as_deref(),
            notes: req.notes.as_deref(),
            promo_code: req.promo_code.as_deref(),
            gift_card_code: req.gift_card_code.as_deref(),
            challenge: None,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
