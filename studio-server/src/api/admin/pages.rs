use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Page, PageCreate, PageUpdate};
use shared::util::is_valid_slug;

use crate::api::{ApiResult, conflict_or_internal, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

fn check_slug(slug: &str) -> Result<(), AppError> {
    if is_valid_slug(slug) {
        Ok(())
    } else {
        Err(AppError::invalid_field("slug", "Slug may only contain lowercase letters, digits and dashes"))
    }
}

fn check_content(content: &serde_json::Value) -> Result<(), AppError> {
    if content.is_null() || content.is_array() || content.is_object() {
        Ok(())
    } else {
        Err(AppError::invalid_field("content", "Content must be a list of blocks"))
    }
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Page>> {
    let pages = db::pages::list(&state.pool).await.map_err(internal)?;
    Ok(Json(pages))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Page> {
    let page = db::pages::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PageNotFound))?;
    Ok(Json(page))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<PageCreate>,
) -> Result<(StatusCode, Json<Page>), AppError> {
    check_slug(&data.slug)?;
    check_content(&data.content)?;
    if data.title.trim().is_empty() {
        return Err(AppError::invalid_field("title", "Title is required"));
    }
    let page = db::pages::create(&state.pool, &data)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::PageSlugExists))?;
    tracing::info!(page_id = page.id, slug = %page.slug, "Page created");
    Ok((StatusCode::CREATED, Json(page)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<PageUpdate>,
) -> ApiResult<Page> {
    if let Some(slug) = &data.slug {
        check_slug(slug)?;
    }
    if let Some(content) = &data.content {
        check_content(content)?;
    }
    let page = db::pages::update(&state.pool, id, &data)
        .await
        .map_err(|e| conflict_or_internal(e, ErrorCode::PageSlugExists))?
        .ok_or_else(|| AppError::new(ErrorCode::PageNotFound))?;
    Ok(Json(page))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::pages::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::PageNotFound)
}
