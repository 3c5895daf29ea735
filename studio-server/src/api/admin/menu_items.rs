use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, MenuItemCreate, MenuItemUpdate, MenuReorderEntry, validate_reorder};
use shared::util::is_valid_slug;

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

use super::deleted;

#[derive(Debug, Deserialize)]
pub struct MenuQuery {
    pub menu: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub menu: String,
    pub items: Vec<MenuReorderEntry>,
}

pub async fn list(State(state): State<AppState>, Query(query): Query<MenuQuery>) -> ApiResult<Vec<MenuItem>> {
    let items = db::menu_items::list(&state.pool, query.menu.as_deref())
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<MenuItem> {
    let item = db::menu_items::get(&state.pool, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(Json(item))
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<MenuItemCreate>,
) -> Result<(StatusCode, Json<MenuItem>), AppError> {
    if !is_valid_slug(&data.menu) {
        return Err(AppError::invalid_field("menu", "Menu name may only contain lowercase letters, digits and dashes"));
    }
    if data.label.trim().is_empty() {
        return Err(AppError::invalid_field("label", "Label is required"));
    }
    if let Some(parent_id) = data.parent_id {
        let parent = db::menu_items::get(&state.pool, parent_id).await.map_err(internal)?;
        if parent.is_none_or(|p| p.menu != data.menu) {
            return Err(AppError::new(ErrorCode::MenuItemInvalidParent).with_detail("parent_id", parent_id));
        }
    }
    let item = db::menu_items::create(&state.pool, &data).await.map_err(internal)?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<MenuItemUpdate>,
) -> ApiResult<MenuItem> {
    if data.label.as_deref().is_some_and(|l| l.trim().is_empty()) {
        return Err(AppError::invalid_field("label", "Label is required"));
    }
    let item = db::menu_items::update(&state.pool, id, &data)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(Json(item))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, AppError> {
    let removed = db::menu_items::delete(&state.pool, id).await.map_err(internal)?;
    deleted(removed, ErrorCode::MenuItemNotFound)
}

/// PUT /api/admin/menu-items/reorder
pub async fn reorder(State(state): State<AppState>, Json(req): Json<ReorderRequest>) -> ApiResult<Vec<MenuItem>> {
    let existing = db::menu_items::list(&state.pool, Some(&req.menu))
        .await
        .map_err(internal)?;
    validate_reorder(&existing, &req.items)
        .map_err(|e| AppError::with_message(ErrorCode::MenuItemInvalidParent, e.to_string()))?;

    db::menu_items::reorder(&state.pool, &req.menu, &req.items)
        .await
        .map_err(internal)?;

    let items = db::menu_items::list(&state.pool, Some(&req.menu))
        .await
        .map_err(internal)?;
    tracing::info!(menu = %req.menu, moved = req.items.len(), "Menu reordered");
    Ok(Json(items))
}
