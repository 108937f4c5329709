//! Order error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// One or more input problems, collected.
    #[error("validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// An update named none of the editable fields.
    #[error("no valid fields to update")]
    NoValidFields,

    /// A search was requested with a blank query.
    #[error("search query is required")]
    EmptyQuery,

    /// Order not found.
    #[error("order not found")]
    NotFound,

    /// The generated order code is already taken. Retrying generates a new one.
    #[error("order code collision: {0}")]
    DuplicateCode(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OrderError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(what) => Self::DuplicateCode(what),
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}
