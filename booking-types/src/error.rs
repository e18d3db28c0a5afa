//! Error types for the booking service.

use crate::ports::GatewayError;

/// Domain-level errors (business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Amount is required")]
    MissingAmount,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Application-level errors.
///
/// Each variant is a distinct failure kind so callers and tests can tell a
/// rejected request apart from a broken dependency, even though the HTTP
/// adapter renders all of them as the same `success: false` envelope.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request itself is incomplete or violates a business rule.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The payment signature did not match.
    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The payment provider answered but produced nothing usable.
    #[error("Gateway declined: {0}")]
    Gateway(String),

    /// A dependency (database, provider transport) failed.
    #[error("Dependency failure: {0}")]
    Dependency(String),
}

impl AppError {
    /// Message safe to show to the client. Dependency details stay internal.
    pub fn public_message(&self) -> Option<&str> {
        match self {
            AppError::Validation(msg)
            | AppError::Verification(msg)
            | AppError::NotFound(msg)
            | AppError::Gateway(msg) => Some(msg),
            AppError::Dependency(_) => None,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::ValidationError(msg) => AppError::Validation(msg),
            e => AppError::Validation(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Appointment not found".into()),
            RepoError::Conflict(msg) => AppError::Validation(msg),
            RepoError::Database(e) => AppError::Dependency(e),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        AppError::Dependency(err.to_string())
    }
}
