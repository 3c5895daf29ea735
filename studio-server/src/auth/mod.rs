//! Back-office authentication and request throttling

pub mod admin_auth;
pub mod rate_limit;

pub use admin_auth::AdminIdentity;
pub use rate_limit::RateLimiter;
