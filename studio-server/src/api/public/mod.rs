//! Public site endpoints (no auth)

pub mod analytics;
pub mod availability;
pub mod bookings;
pub mod catalog;
pub mod challenges;
pub mod vouchers;
