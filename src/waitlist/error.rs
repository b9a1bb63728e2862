//! Error taxonomy for waitlist operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WaitlistError {
    /// Malformed input, rejected before any mutation.
    #[error("validation failed: {0}")]
    Validation(&'static str),

    /// Unique-constraint violation on the email column.
    #[error("email is already registered")]
    DuplicateEmail,

    /// Lookup miss.
    #[error("entry not found")]
    NotFound,

    /// Transient storage failure; callers of position-affecting
    /// operations may retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),
}

impl WaitlistError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            WaitlistError::Validation(_) => "VALIDATION_ERROR",
            WaitlistError::DuplicateEmail => "DUPLICATE_ENTRY",
            WaitlistError::NotFound => "NOT_FOUND",
            WaitlistError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }
}
