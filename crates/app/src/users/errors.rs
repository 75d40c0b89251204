//! User directory errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::{task::JoinError, time::error::Elapsed};

/// Credential hashing failures.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// Salt encoding or hashing failed.
    #[error("failed to hash credential: {0}")]
    Hash(String),

    /// The blocking worker panicked or was cancelled.
    #[error("credential worker failed")]
    Worker(#[source] JoinError),
}

/// User directory error variants.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// User was not found.
    #[error("user not found")]
    NotFound,

    /// Email address is already registered.
    #[error("email already exists")]
    EmailTaken,

    /// Provided data violated a storage constraint.
    #[error("invalid data")]
    InvalidData,

    /// Hashing or verifying a credential failed.
    #[error("credential error")]
    Credential(#[from] CredentialError),

    /// The directory did not answer within the configured bound.
    #[error("user directory timed out")]
    Timeout,

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for UserDirectoryError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::EmailTaken,
            Some(ErrorKind::NotNullViolation | ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<Elapsed> for UserDirectoryError {
    fn from(_elapsed: Elapsed) -> Self {
        Self::Timeout
    }
}
