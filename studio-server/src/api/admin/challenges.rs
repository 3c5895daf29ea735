use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::challenge::ChallengeStatus;
use shared::error::{AppError, ErrorCode};
use shared::models::{ChallengeStatusUpdate, PhotoChallenge};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::services;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChallengeQuery {
    pub status: Option<ChallengeStatus>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ChallengeQuery>,
) -> ApiResult<Vec<PhotoChallenge>> {
    let challenges = db::challenges::list(&state.pool, query.status).await.map_err(internal)?;
    Ok(Json(challenges))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<PhotoChallenge> {
    let challenge = db::challenges::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::ChallengeNotFound))?;
    Ok(Json(challenge))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ChallengeStatusUpdate>,
) -> ApiResult<PhotoChallenge> {
    let challenge = services::challenge::set_status(&state, id, req.status).await?;
    Ok(Json(challenge))
}
