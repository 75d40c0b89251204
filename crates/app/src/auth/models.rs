//! Auth data models.

use std::fmt;

use jiff::{SignedDuration, Timestamp};

use crate::{
    auth::TokenFingerprint,
    users::UserId,
};

/// Purpose a token was issued for; a token is only accepted for its own scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenScope {
    /// Single-use account activation.
    Activation,

    /// Browser session.
    Authentication,
}

impl TokenScope {
    /// Time-to-live assigned when a token of this scope is issued.
    #[must_use]
    pub const fn ttl(self) -> SignedDuration {
        match self {
            Self::Activation => SignedDuration::from_hours(72),
            Self::Authentication => SignedDuration::from_hours(24),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Activation => "activation",
            Self::Authentication => "authentication",
        }
    }
}

impl fmt::Display for TokenScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token row persisted by a [`TokenStore`](crate::auth::TokenStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// Storage key; the raw token is never stored.
    pub fingerprint: TokenFingerprint,

    /// User the token was issued to.
    pub user: UserId,

    /// Instant after which the token is no longer accepted.
    pub expires_at: Timestamp,

    /// Purpose the token may be used for.
    pub scope: TokenScope,
}

impl TokenRecord {
    /// Build a record expiring one scope TTL after `issued_at`.
    #[must_use]
    pub fn issue(
        fingerprint: TokenFingerprint,
        user: UserId,
        scope: TokenScope,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            fingerprint,
            user,
            expires_at: issued_at + scope.ttl(),
            scope,
        }
    }

    /// A record is valid strictly before its expiry instant.
    #[must_use]
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.expires_at > now
    }
}

/// Owner and deadline of a token that is currently valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidToken {
    /// Owner of the token.
    pub user: UserId,

    /// Instant from which the token stops resolving.
    pub expires_at: Timestamp,
}

impl From<&TokenRecord> for ValidToken {
    fn from(record: &TokenRecord) -> Self {
        Self {
            user: record.user,
            expires_at: record.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::auth::fingerprint;

    use super::*;

    #[test]
    fn scope_ttls_match_issuance_policy() {
        assert_eq!(TokenScope::Activation.ttl(), SignedDuration::from_hours(72));
        assert_eq!(TokenScope::Authentication.ttl(), SignedDuration::from_hours(24));
    }

    #[test]
    fn record_is_invalid_from_its_expiry_instant() {
        let issued_at = Timestamp::UNIX_EPOCH;
        let record = TokenRecord::issue(
            fingerprint("token"),
            UserId::new(1),
            TokenScope::Authentication,
            issued_at,
        );

        assert_eq!(record.expires_at, issued_at + SignedDuration::from_hours(24));
        assert!(record.is_valid_at(record.expires_at - SignedDuration::from_secs(1)));
        assert!(!record.is_valid_at(record.expires_at));
    }
}
