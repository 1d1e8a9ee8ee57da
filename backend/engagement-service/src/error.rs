/// Error types for the engagement service
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Referenced user/film/review/director does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed parameter, e.g. a non-positive identifier
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Duplicate membership where idempotence was not requested
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Transient store failure (timeout, connectivity); retryable
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Non-transient store failure, surfaced unchanged
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Broken invariant inside the store, e.g. a corrupt enum column
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Only `StoreUnavailable` is eligible for automatic retry by callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::StoreUnavailable(_))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        let transient = matches!(
            err,
            sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
                | sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
        );
        if transient {
            return ServiceError::StoreUnavailable(err.to_string());
        }

        if let sqlx::Error::Database(db) = &err {
            if let Some(code) = db.code().as_deref() {
                if transient_sqlstate(code) {
                    return ServiceError::StoreUnavailable(err.to_string());
                }
                // 23505 unique_violation
                if code == "23505" {
                    return ServiceError::Conflict(db.message().to_string());
                }
            }
        }

        ServiceError::Database(err)
    }
}

/// 57014 query_canceled (statement_timeout), the whole class 08 of
/// connection exceptions, 53300 too_many_connections.
fn transient_sqlstate(code: &str) -> bool {
    code == "57014" || code == "53300" || code.starts_with("08")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_store_unavailable_is_retryable() {
        assert!(ServiceError::StoreUnavailable("timeout".into()).is_retryable());
        assert!(!ServiceError::NotFound("user 7".into()).is_retryable());
        assert!(!ServiceError::InvalidArgument("id must be positive".into()).is_retryable());
        assert!(!ServiceError::Conflict("duplicate like".into()).is_retryable());
        assert!(!ServiceError::Internal("corrupt row".into()).is_retryable());
    }

    #[test]
    fn test_pool_timeout_maps_to_store_unavailable() {
        let err: ServiceError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_row_not_found_maps_to_database() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::Database(_)));
    }

    #[test]
    fn test_transient_sqlstates_cover_the_connection_class() {
        for code in ["08000", "08001", "08003", "08004", "08006", "08007", "08P01"] {
            assert!(transient_sqlstate(code), "{} should be transient", code);
        }
        assert!(transient_sqlstate("57014"));
        assert!(transient_sqlstate("53300"));
        assert!(!transient_sqlstate("23505"));
        assert!(!transient_sqlstate("42P01"));
    }
}
