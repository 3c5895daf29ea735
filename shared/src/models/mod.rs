//! Data models
//!
//! Shared between studio-server and the web front-end (via API).
//! Enum-free row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are snowflake `i64`, all timestamps Unix millis.

pub mod analytics;
pub mod booking;
pub mod challenge;
pub mod gift_card;
pub mod menu_item;
pub mod page;
pub mod promo_code;
pub mod service_type;
pub mod setting;
pub mod testimonial;

// Re-exports
pub use analytics::*;
pub use booking::*;
pub use challenge::*;
pub use gift_card::*;
pub use menu_item::*;
pub use page::*;
pub use promo_code::*;
pub use service_type::*;
pub use setting::*;
pub use testimonial::*;
