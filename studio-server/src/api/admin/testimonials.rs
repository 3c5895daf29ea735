use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Testimonial, TestimonialCreate, TestimonialUpdate};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

fn check_rating(rating: i32) -> Result<(), AppError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::with_message(ErrorCode::ValueOutOfRange, "Rating must be between 1 and 5").with_detail("field", "rating"))
    }
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Testimonial>> {
    let items = db::testimonials::list(&state.pool, false).await.map_err(internal)?;
    Ok(Json(items))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Testimonial> {
    let item = db::testimonials::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TestimonialNotFound))?;
    Ok(Json(item))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<TestimonialCreate>,
) -> Result<(StatusCode, Json<Testimonial>), AppError> {
    check_rating(data.rating)?;
    if data.author_name.trim().is_empty() || data.content.trim().is_empty() {
        return Err(AppError::validation("Author and content are required"));
    }
    let item = db::testimonials::create(&state.pool, &data).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<TestimonialUpdate>,
) -> ApiResult<Testimonial> {
    if let Some(rating) = data.rating {
        check_rating(rating)?;
    }
    let item = db::testimonials::update(&state.pool, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::TestimonialNotFound))?;
    Ok(Json(item))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::testimonials::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::TestimonialNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_range() {
        assert!(check_rating(1).is_ok());
        assert!(check_rating(5).is_ok());
        assert_eq!(check_rating(0).unwrap_err().code, ErrorCode::ValueOutOfRange);
        assert_eq!(check_rating(6).unwrap_err().code, ErrorCode::ValueOutOfRange);
    }
}
