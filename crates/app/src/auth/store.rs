//! Token store abstraction.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;

use crate::auth::{TokenFingerprint, TokenRecord, TokenScope, TokenStoreError, ValidToken};

/// Durable fingerprint-keyed token storage.
///
/// Every operation is atomic per row; no operation spans rows transactionally.
#[automock]
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a new record, failing with [`TokenStoreError::DuplicateKey`] when
    /// the fingerprint is already present.
    async fn insert(&self, record: TokenRecord) -> Result<(), TokenStoreError>;

    /// Return the owner and expiry when a record exists for `fingerprint` with
    /// the given scope and an expiry after `now`.
    async fn find_valid(
        &self,
        fingerprint: TokenFingerprint,
        scope: TokenScope,
        now: Timestamp,
    ) -> Result<Option<ValidToken>, TokenStoreError>;

    /// Remove the record for `fingerprint` if it carries `scope`. Returns `true`
    /// when a row was actually deleted; deleting an absent fingerprint is not an
    /// error.
    async fn delete(
        &self,
        fingerprint: TokenFingerprint,
        scope: TokenScope,
    ) -> Result<bool, TokenStoreError>;

    /// Remove every record whose expiry is at or before `now`.
    async fn sweep_expired(&self, now: Timestamp) -> Result<u64, TokenStoreError>;
}
