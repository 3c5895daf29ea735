//! Back-office endpoints (admin JWT)
//!
//! Writes validate input, hit PostgreSQL directly and return the stored
//! record. Deletes answer 204, or 404 when nothing was removed.

pub mod analytics;
pub mod auth;
pub mod bookings;
pub mod challenges;
pub mod gift_cards;
pub mod menu_items;
pub mod pages;
pub mod promo_codes;
pub mod service_types;
pub mod settings;
pub mod testimonials;

use axum::http::StatusCode;
use shared::error::{AppError, ErrorCode};

/// 204 when a row was removed, `code` otherwise
fn deleted(removed: bool, code: ErrorCode) -> Result<StatusCode, AppError> {
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::new(code))
    }
}
