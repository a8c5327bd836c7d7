//! Unified service-layer error type
//!
//! `ServiceError` bridges store errors (`sqlx::Error`) and the API-layer error
//! (`AppError`), so engines can use `?` on both without hand-written
//! `.map_err(...)` at every call site.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

/// Service-layer error
///
/// - `Db`: store failure (logged, surfaced as `DatabaseError` without detail)
/// - `App`: business-rule error, passed through to the client unchanged
#[derive(Debug)]
pub enum ServiceError {
    Db(sqlx::Error),
    App(AppError),
}

impl ServiceError {
    /// True when the store rejected a write because of a UNIQUE index
    pub fn is_unique_violation(&self) -> bool {
        match self {
            ServiceError::Db(e) => is_unique_violation(e),
            ServiceError::App(_) => false,
        }
    }
}

pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
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
            ServiceError::Db(db_err) if is_unique_violation(&db_err) => {
                tracing::warn!(error = %db_err, "Unique constraint violated");
                AppError::new(ErrorCode::AlreadyExists)
            }
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "database error: {e}"),
            ServiceError::App(e) => write!(f, "{e}"),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_hides_internal_message() {
        let err: AppError = ServiceError::Db(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.message, "Database error");
        assert!(err.details.is_none());
    }

    #[test]
    fn test_app_error_passes_through() {
        let err: AppError = ServiceError::App(AppError::access_denied()).into();
        assert_eq!(err.code, ErrorCode::AccessDenied);
        assert!(!ServiceError::App(AppError::access_denied()).is_unique_violation());
    }
}
