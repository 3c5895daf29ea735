//! Service-layer error type
//!
//! `ServiceError` sits between the DB layer (`sqlx::Error`, `BoxError`) and
//! the API layer (`AppError`), so multi-step operations can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::BoxError;

/// - `Db`: database or infrastructure failure, logged and mapped to `InternalError`
/// - `App`: business-rule error passed through to the client unchanged
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("database error: {0}")]
    Db(BoxError),
    #[error("{:?}: {}", .0.code, .0.message)]
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_pass_through() {
        let err: AppError = ServiceError::from(AppError::new(ErrorCode::SlotUnavailable)).into();
        assert_eq!(err.code, ErrorCode::SlotUnavailable);
    }

    #[test]
    fn db_errors_become_internal() {
        let err: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.code, ErrorCode::InternalError);

        let boxed: BoxError = "connection reset".into();
        let err: AppError = ServiceError::from(boxed).into();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[test]
    fn display_names_the_failure() {
        let boxed: BoxError = "connection reset".into();
        assert_eq!(ServiceError::from(boxed).to_string(), "database error: connection reset");

        let err = ServiceError::from(AppError::with_message(ErrorCode::SlotUnavailable, "taken"));
        assert_eq!(err.to_string(), "SlotUnavailable: taken");
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }

    #[test]
    fn response_status_follows_code() {
        let resp = ServiceError::from(AppError::new(ErrorCode::DayFullyBooked)).into_response();
        assert_eq!(resp.status(), http::StatusCode::CONFLICT);
    }
}
