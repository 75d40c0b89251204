//! Auth repository.

use async_trait::async_trait;
use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{PgPool, Postgres, query, query_as};
use tracing::debug;

use crate::{
    auth::{
        TokenFingerprint, TokenRecord, TokenScope, TokenStore, TokenStoreError, ValidToken,
    },
    users::UserId,
};

const INSERT_TOKEN_SQL: &str = include_str!("sql/insert_token.sql");
const FIND_VALID_TOKEN_SQL: &str = include_str!("sql/find_valid_token.sql");
const DELETE_TOKEN_SQL: &str = include_str!("sql/delete_token.sql");
const SWEEP_EXPIRED_TOKENS_SQL: &str = include_str!("sql/sweep_expired_tokens.sql");

/// Rows removed per sweep statement.
const SWEEP_BATCH_SIZE: i64 = 500;

/// PostgreSQL-backed token store.
#[derive(Debug, Clone)]
pub struct PgTokenStore {
    pool: PgPool,
}

impl PgTokenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenStore for PgTokenStore {
    async fn insert(&self, record: TokenRecord) -> Result<(), TokenStoreError> {
        query::<Postgres>(INSERT_TOKEN_SQL)
            .bind(record.fingerprint.as_bytes().as_slice())
            .bind(record.user.into_inner())
            .bind(SqlxTimestamp::from(record.expires_at))
            .bind(record.scope.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_valid(
        &self,
        fingerprint: TokenFingerprint,
        scope: TokenScope,
        now: Timestamp,
    ) -> Result<Option<ValidToken>, TokenStoreError> {
        let row = query_as::<Postgres, (i64, SqlxTimestamp)>(FIND_VALID_TOKEN_SQL)
            .bind(fingerprint.as_bytes().as_slice())
            .bind(scope.as_str())
            .bind(SqlxTimestamp::from(now))
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(user, expires_at)| ValidToken {
            user: UserId::new(user),
            expires_at: expires_at.to_jiff(),
        }))
    }

    async fn delete(
        &self,
        fingerprint: TokenFingerprint,
        scope: TokenScope,
    ) -> Result<bool, TokenStoreError> {
        let result = query::<Postgres>(DELETE_TOKEN_SQL)
            .bind(fingerprint.as_bytes().as_slice())
            .bind(scope.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn sweep_expired(&self, now: Timestamp) -> Result<u64, TokenStoreError> {
        let mut removed = 0;

        // Batched so no statement holds row locks for longer than one batch.
        loop {
            let batch = query::<Postgres>(SWEEP_EXPIRED_TOKENS_SQL)
                .bind(SqlxTimestamp::from(now))
                .bind(SWEEP_BATCH_SIZE)
                .execute(&self.pool)
                .await?
                .rows_affected();

            removed += batch;

            if batch < SWEEP_BATCH_SIZE.unsigned_abs() {
                break;
            }
        }

        debug!(removed, "swept expired tokens");

        Ok(removed)
    }
}
