//! Shared types for the studio back-end
//!
//! Domain models, the unified error system and the pure business rules
//! (slot availability, photo challenge lifecycle, voucher pricing) used by
//! the HTTP server. Nothing in here performs I/O.

pub mod availability;
pub mod challenge;
pub mod error;
pub mod models;
pub mod pricing;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
