//! Database access layer
//!
//! One module per table. Reads return `Option` for single rows, partial
//! updates use `COALESCE` and `RETURNING` so a missing row surfaces as `None`.

pub mod analytics;
pub mod bookings;
pub mod challenges;
pub mod gift_cards;
pub mod menu_items;
pub mod pages;
pub mod promo_codes;
pub mod service_types;
pub mod settings;
pub mod testimonials;
pub mod webhook_events;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub(crate) use shared::util::snowflake_id;

/// Whether the error is a unique constraint violation (duplicate slug, code, ...).
pub fn is_unique_violation(err: &BoxError) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_not_unique_violations() {
        let err: BoxError = "Page not found".into();
        assert!(!is_unique_violation(&err));

        let err: BoxError = Box::new(sqlx::Error::RowNotFound);
        assert!(!is_unique_violation(&err));
    }
}
