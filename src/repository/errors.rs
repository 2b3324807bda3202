use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Error type shared by all repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The connection pool could not hand out a connection.
    #[error("database pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    /// A stored row violated a domain constraint during conversion.
    #[error("validation error: {0}")]
    Validation(String),
    /// Requested record does not exist.
    #[error("record not found")]
    NotFound,
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(value: TypeConstraintError) -> Self {
        Self::Validation(value.to_string())
    }
}

/// Convenient alias for results returned from repository functions.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
