//! Photo challenge: sending, invitation page, answer, scheduling

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::AppError;
use shared::models::{
    Booking, ChallengeInvitation, ChallengeRespond, ChallengeSchedule, CheckoutRedirect, PhotoChallengeCreate,
};

use crate::api::ApiResult;
use crate::services::{challenge, checkout};
use crate::state::AppState;

/// POST /api/challenges
pub async fn send(
    State(state): State<AppState>,
    Json(req): Json<PhotoChallengeCreate>,
) -> Result<(StatusCode, Json<CheckoutRedirect>), AppError> {
    let redirect = checkout::send_challenge(&state, &req).await?;
    Ok((StatusCode::CREATED, Json(redirect)))
}

/// GET /api/challenges/{token}
pub async fn open(State(state): State<AppState>, Path(token): Path<String>) -> ApiResult<ChallengeInvitation> {
    let c = challenge::open(&state, &token).await?;
    Ok(Json(ChallengeInvitation::from(&c)))
}

/// PUT /api/challenges/{token}/respond
pub async fn respond(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ChallengeRespond>,
) -> ApiResult<ChallengeInvitation> {
    let c = challenge::respond(&state, &token, req.accept).await?;
    Ok(Json(ChallengeInvitation::from(&c)))
}

/// POST /api/challenges/{token}/schedule
pub async fn schedule(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ChallengeSchedule>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let booking = challenge::schedule(&state, &token, &req).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
