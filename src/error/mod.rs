//! Application error types for robust error handling.

use thiserror::Error;

/// Application-level errors.
///
/// `NotFound` and `Validation` carry the exact message surfaced to GraphQL
/// clients, so their `Display` output is the bare message with no prefix.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
