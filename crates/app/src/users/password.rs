//! Argon2id credential hashing.

use argon2::{
    Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use async_trait::async_trait;
use mockall::automock;
use rand::{RngCore, rngs::OsRng};
use tokio::{sync::OnceCell, task};

use crate::{
    auth::generate_token,
    users::{CredentialError, Secret},
};

const SALT_BYTES: usize = 16;

/// Hash `secret` into a PHC string.
///
/// # Errors
///
/// Returns an error if salt encoding or hashing fails.
pub fn hash_password(secret: &Secret) -> Result<String, CredentialError> {
    let mut salt = [0_u8; SALT_BYTES];

    OsRng.fill_bytes(&mut salt);

    let salt = SaltString::encode_b64(&salt)
        .map_err(|error| CredentialError::Hash(error.to_string()))?;

    Argon2::default()
        .hash_password(secret.expose().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| CredentialError::Hash(error.to_string()))
}

/// Check `secret` against a stored PHC string. Unparseable hashes never verify.
#[must_use]
pub fn verify_password(secret: &Secret, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(secret.expose().as_bytes(), &parsed)
            .is_ok()
    })
}

/// [`hash_password`] on the blocking pool.
///
/// # Errors
///
/// Returns an error if hashing fails or the worker task is lost.
pub async fn hash_password_blocking(secret: Secret) -> Result<String, CredentialError> {
    task::spawn_blocking(move || hash_password(&secret))
        .await
        .map_err(CredentialError::Worker)?
}

/// [`verify_password`] on the blocking pool.
///
/// # Errors
///
/// Returns an error if the worker task is lost.
pub async fn verify_password_blocking(
    secret: Secret,
    stored_hash: String,
) -> Result<bool, CredentialError> {
    task::spawn_blocking(move || verify_password(&secret, &stored_hash))
        .await
        .map_err(CredentialError::Worker)
}

/// Hashes and checks credential secrets.
#[automock]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash a new secret for storage.
    async fn hash(&self, secret: Secret) -> Result<String, CredentialError>;

    /// Check `secret` against a stored hash.
    async fn verify(&self, secret: Secret, stored_hash: String) -> Result<bool, CredentialError>;

    /// A stored-hash stand-in to verify against when no account matches,
    /// so an unknown email costs the same work as a wrong secret.
    async fn decoy_hash(&self) -> Result<String, CredentialError>;
}

/// Argon2id hashing on the blocking pool.
#[derive(Debug, Default)]
pub struct Argon2Hasher {
    decoy: OnceCell<String>,
}

impl Argon2Hasher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, secret: Secret) -> Result<String, CredentialError> {
        hash_password_blocking(secret).await
    }

    async fn verify(&self, secret: Secret, stored_hash: String) -> Result<bool, CredentialError> {
        verify_password_blocking(secret, stored_hash).await
    }

    async fn decoy_hash(&self) -> Result<String, CredentialError> {
        self.decoy
            .get_or_try_init(|| hash_password_blocking(Secret::new(generate_token().as_str())))
            .await
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn hash_verifies_against_original_secret() -> TestResult {
        let hash = hash_password(&Secret::new("correct horse"))?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&Secret::new("correct horse"), &hash));
        assert!(!verify_password(&Secret::new("battery staple"), &hash));

        Ok(())
    }

    #[test]
    fn hashes_are_salted() -> TestResult {
        let first = hash_password(&Secret::new("same"))?;
        let second = hash_password(&Secret::new("same"))?;

        assert_ne!(first, second);

        Ok(())
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password(&Secret::new("anything"), "not-a-phc-string"));
    }

    #[tokio::test]
    async fn blocking_variants_agree() -> TestResult {
        let hash = hash_password_blocking(Secret::new("pw")).await?;

        assert!(verify_password_blocking(Secret::new("pw"), hash).await?);

        Ok(())
    }

    #[tokio::test]
    async fn decoy_hash_is_a_stable_argon2_hash() -> TestResult {
        let hasher = Argon2Hasher::new();

        let first = hasher.decoy_hash().await?;
        let second = hasher.decoy_hash().await?;

        assert!(first.starts_with("$argon2id$"), "decoy must cost a real verify");
        assert_eq!(first, second);
        assert!(!hasher.verify(Secret::new("hunter2"), first).await?);

        Ok(())
    }
}
