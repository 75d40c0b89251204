//! Auth errors.

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;
use tokio::time::error::Elapsed;

use crate::users::UserDirectoryError;

/// Token store failures.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    /// A record with the same fingerprint already exists.
    #[error("token fingerprint already exists")]
    DuplicateKey,

    /// The referenced user does not exist.
    #[error("token references an unknown user")]
    InvalidReference,

    /// The store did not answer within the configured bound.
    #[error("token store timed out")]
    Timeout,

    /// Underlying SQL/storage error.
    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for TokenStoreError {
    fn from(error: Error) -> Self {
        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateKey,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<Elapsed> for TokenStoreError {
    fn from(_elapsed: Elapsed) -> Self {
        Self::Timeout
    }
}

/// Auth service errors.
///
/// Absent, expired, wrong-scope and malformed tokens all surface as
/// [`AuthServiceError::TokenNotFound`].
#[derive(Debug, Error)]
pub enum AuthServiceError {
    /// Unknown email or wrong secret; the two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredential,

    /// The credential is valid but the account is not yet active.
    #[error("account not activated")]
    NotActivated,

    /// Absent, expired, wrong-scope or malformed token.
    #[error("token not found")]
    TokenNotFound,

    /// Every generated token collided with an existing fingerprint.
    #[error("token generation collided repeatedly")]
    DuplicateKey,

    /// Registration used an email that already has an account.
    #[error("email already registered")]
    EmailTaken,

    /// A registration field was blank.
    #[error("registration is missing required fields")]
    InvalidRegistration,

    /// The token store failed or timed out.
    #[error("token store error")]
    Store(#[source] TokenStoreError),

    /// The user directory failed or timed out.
    #[error("user directory error")]
    Directory(#[source] UserDirectoryError),
}

impl From<TokenStoreError> for AuthServiceError {
    fn from(error: TokenStoreError) -> Self {
        Self::Store(error)
    }
}

impl From<UserDirectoryError> for AuthServiceError {
    fn from(error: UserDirectoryError) -> Self {
        match error {
            UserDirectoryError::EmailTaken => Self::EmailTaken,
            other => Self::Directory(other),
        }
    }
}
