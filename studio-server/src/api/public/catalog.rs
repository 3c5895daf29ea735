//! Published site content: packages, pages, menus, testimonials

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuNode, Page, ServiceType, Testimonial, build_menu_tree};

use crate::api::{ApiResult, internal};
use crate::db;
use crate::state::AppState;

/// GET /api/service-types
pub async fn list_service_types(State(state): State<AppState>) -> ApiResult<Vec<ServiceType>> {
    let types = db::service_types::list(&state.pool, true)
        .await
        .map_err(internal)?;
    Ok(Json(types))
}

/// GET /api/pages/{slug}
pub async fn get_page(State(state): State<AppState>, Path(slug): Path<String>) -> ApiResult<Page> {
    let page = db::pages::find_published(&state.pool, &slug)
        .await
        .map_err(internal)?
        .ok_or_else(|| AppError::new(ErrorCode::PageNotFound).with_detail("slug", slug))?;
    Ok(Json(page))
}

/// GET /api/menus/{menu}
pub async fn get_menu(State(state): State<AppState>, Path(menu): Path<String>) -> ApiResult<Vec<MenuNode>> {
    let items = db::menu_items::list(&state.pool, Some(&menu))
        .await
        .map_err(internal)?;
    Ok(Json(build_menu_tree(&items)))
}

/// GET /api/testimonials
pub async fn list_testimonials(State(state): State<AppState>) -> ApiResult<Vec<Testimonial>> {
    let items = db::testimonials::list(&state.pool, true)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}
