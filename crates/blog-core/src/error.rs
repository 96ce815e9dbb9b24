//! Domain-level error types.

use thiserror::Error;

/// Domain errors - entity and content failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A blank or invalid argument, raised before any I/O.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    /// A collaborator the operation needs was never supplied.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl From<DomainError> for RepoError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => RepoError::Precondition(msg),
            DomainError::Serialization(msg) => RepoError::Serialization(msg),
        }
    }
}
