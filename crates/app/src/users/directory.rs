//! User directory.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::users::{
    Argon2Hasher, CredentialHasher, NewUser, Secret, User, UserDirectoryError, UserId,
    repository::{PgUsersRepository, UserCredentials},
};

/// PostgreSQL-backed [`UserDirectory`].
#[derive(Clone)]
pub struct PgUserDirectory {
    repository: PgUsersRepository,
    hasher: Arc<dyn CredentialHasher>,
}

impl fmt::Debug for PgUserDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgUserDirectory")
            .field("repository", &self.repository)
            .finish_non_exhaustive()
    }
}

impl PgUserDirectory {
    /// Directory hashing credentials with Argon2id.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgUsersRepository::new(pool),
            hasher: Arc::new(Argon2Hasher::new()),
        }
    }
}

/// Check `secret` against `credentials`, spending one verify whether or not
/// an account was found.
async fn check_credential(
    hasher: &dyn CredentialHasher,
    credentials: Option<UserCredentials>,
    secret: &Secret,
) -> Result<Option<User>, UserDirectoryError> {
    let Some(credentials) = credentials else {
        let decoy = hasher.decoy_hash().await?;
        hasher.verify(secret.clone(), decoy).await?;

        return Ok(None);
    };

    let valid = hasher
        .verify(secret.clone(), credentials.password_hash)
        .await?;

    Ok(valid.then_some(credentials.user))
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn create_user(&self, user: NewUser) -> Result<User, UserDirectoryError> {
        let NewUser {
            first_name,
            last_name,
            email,
            password,
        } = user;

        let password_hash = self.hasher.hash(password).await?;

        self.repository
            .create_user(&first_name, &last_name, &email, &password_hash)
            .await
            .map_err(Into::into)
    }

    async fn get_user(&self, user: UserId) -> Result<User, UserDirectoryError> {
        self.repository.get_user(user).await.map_err(Into::into)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserDirectoryError> {
        self.repository
            .find_user_by_email(email)
            .await
            .map_err(Into::into)
    }

    async fn is_activated(&self, user: UserId) -> Result<bool, UserDirectoryError> {
        self.get_user(user).await.map(|user| user.is_active)
    }

    async fn set_activated(&self, user: UserId) -> Result<(), UserDirectoryError> {
        if self.repository.activate_user(user).await? == 0 {
            return Err(UserDirectoryError::NotFound);
        }

        Ok(())
    }

    async fn verify_credential(
        &self,
        email: &str,
        secret: &Secret,
    ) -> Result<Option<User>, UserDirectoryError> {
        let credentials = self.repository.find_credentials_by_email(email).await?;

        check_credential(self.hasher.as_ref(), credentials, secret).await
    }
}

#[automock]
#[async_trait]
/// User profile and activation-state operations.
pub trait UserDirectory: Send + Sync {
    /// Creates an inactive user, hashing the submitted password.
    async fn create_user(&self, user: NewUser) -> Result<User, UserDirectoryError>;

    /// Retrieve a single user.
    async fn get_user(&self, user: UserId) -> Result<User, UserDirectoryError>;

    /// Look a user up by email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserDirectoryError>;

    /// Whether the user has followed their activation link.
    async fn is_activated(&self, user: UserId) -> Result<bool, UserDirectoryError>;

    /// Marks a user as activated. Activating an active user is a no-op.
    async fn set_activated(&self, user: UserId) -> Result<(), UserDirectoryError>;

    /// Returns the user when `secret` matches the stored credential.
    ///
    /// An unknown email and a wrong secret both yield `Ok(None)`.
    async fn verify_credential(
        &self,
        email: &str,
        secret: &Secret,
    ) -> Result<Option<User>, UserDirectoryError>;
}
