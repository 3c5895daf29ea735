//! API routes for studio-server

pub mod admin;
pub mod health;
pub mod public;
pub mod stripe_webhook;

use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use shared::error::{AppError, ErrorCode};

use crate::auth::admin_auth::admin_auth_middleware;
use crate::auth::rate_limit;
use crate::db::{self, BoxError};
use crate::state::AppState;

pub(crate) type ApiResult<T> = Result<Json<T>, AppError>;

fn internal(e: impl std::fmt::Display) -> AppError {
    tracing::error!("Query error: {e}");
    AppError::new(ErrorCode::InternalError)
}

/// Unique violations become `code`, anything else is internal.
fn conflict_or_internal(e: BoxError, code: ErrorCode) -> AppError {
    if db::is_unique_violation(&e) {
        AppError::new(code)
    } else {
        internal(e)
    }
}

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Public read-only content
    let content = Router::new()
        .route("/api/service-types", get(public::catalog::list_service_types))
        .route("/api/pages/{slug}", get(public::catalog::get_page))
        .route("/api/menus/{menu}", get(public::catalog::get_menu))
        .route("/api/testimonials", get(public::catalog::list_testimonials))
        .route("/api/availability", get(public::availability::day))
        .route("/api/availability/month", get(public::availability::month))
        .route("/api/promo-codes/validate", post(public::vouchers::validate_promo_code))
        .route("/api/challenges/{token}", get(public::challenges::open));

    let bookings = Router::new()
        .route("/api/bookings", post(public::bookings::create))
        .route("/api/challenges/{token}/schedule", post(public::challenges::schedule))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::booking_rate_limit));

    let checkout = Router::new()
        .route("/api/gift-cards/purchase", post(public::vouchers::purchase_gift_card))
        .route("/api/gift-cards/{code}", get(public::vouchers::gift_card_balance))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::checkout_rate_limit));

    let challenges = Router::new()
        .route("/api/challenges", post(public::challenges::send))
        .route("/api/challenges/{token}/respond", put(public::challenges::respond))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::challenge_rate_limit));

    let analytics = Router::new()
        .route("/api/analytics/events", post(public::analytics::track))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::analytics_rate_limit));

    let login = Router::new()
        .route("/api/admin/login", post(admin::auth::login))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit::login_rate_limit));

    // Stripe webhook (signature-verified, raw body)
    let webhook = Router::new().route("/stripe/webhook", post(stripe_webhook::handle_webhook));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(content)
        .merge(bookings)
        .merge(checkout)
        .merge(challenges)
        .merge(analytics)
        .merge(login)
        .merge(webhook)
        .merge(admin_router(state.clone()))
        .with_state(state)
}

/// Back-office API (JWT authenticated)
fn admin_router(state: AppState) -> Router<AppState> {
    use admin::*;

    Router::new()
        .route("/api/admin/me", get(auth::me))
        // Pages
        .route("/api/admin/pages", get(pages::list).post(pages::create))
        .route(
            "/api/admin/pages/{id}",
            get(pages::get).put(pages::update).delete(pages::delete),
        )
        // Menu items
        .route("/api/admin/menu-items", get(menu_items::list).post(menu_items::create))
        .route("/api/admin/menu-items/reorder", put(menu_items::reorder))
        .route(
            "/api/admin/menu-items/{id}",
            get(menu_items::get).put(menu_items::update).delete(menu_items::delete),
        )
        // Bookings
        .route("/api/admin/bookings", get(bookings::list))
        .route(
            "/api/admin/bookings/{id}",
            get(bookings::get).put(bookings::update).delete(bookings::delete),
        )
        .route("/api/admin/bookings/{id}/status", put(bookings::update_status))
        // Testimonials
        .route("/api/admin/testimonials", get(testimonials::list).post(testimonials::create))
        .route(
            "/api/admin/testimonials/{id}",
            get(testimonials::get).put(testimonials::update).delete(testimonials::delete),
        )
        // Promo codes
        .route("/api/admin/promo-codes", get(promo_codes::list).post(promo_codes::create))
        .route(
            "/api/admin/promo-codes/{id}",
            get(promo_codes::get).put(promo_codes::update).delete(promo_codes::delete),
        )
        // Gift cards
        .route("/api/admin/gift-cards", get(gift_cards::list).post(gift_cards::create))
        .route(
            "/api/admin/gift-cards/{id}",
            get(gift_cards::get).put(gift_cards::update).delete(gift_cards::delete),
        )
        // Service types
        .route("/api/admin/service-types", get(service_types::list).post(service_types::create))
        .route(
            "/api/admin/service-types/{id}",
            get(service_types::get).put(service_types::update).delete(service_types::delete),
        )
        // Photo challenges
        .route("/api/admin/challenges", get(challenges::list))
        .route("/api/admin/challenges/{id}", get(challenges::get))
        .route("/api/admin/challenges/{id}/status", put(challenges::update_status))
        // Settings
        .route("/api/admin/settings", get(settings::list))
        .route(
            "/api/admin/settings/{key}",
            get(settings::get).put(settings::put).delete(settings::delete),
        )
        // Analytics
        .route("/api/admin/analytics/dashboard", get(analytics::dashboard))
        .layer(middleware::from_fn_with_state(state, admin_auth_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_unique_errors_are_internal() {
        let err = conflict_or_internal("boom".into(), ErrorCode::PageSlugExists);
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
