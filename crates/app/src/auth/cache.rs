//! In-memory session cache.

use std::fmt;

use jiff::Timestamp;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::{auth::ValidToken, users::UserId};

/// Snapshot of the cache's removal counter, taken before a store read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEpoch(u64);

/// Concurrent map from raw authentication token to user.
///
/// Entries only ever describe tokens that were valid in the store when
/// inserted, and keep the deadline the store reported so a hit never outlives
/// the record it mirrors. Every removal advances the epoch so that a
/// read-through fill racing a removal is discarded.
#[derive(Default)]
pub struct SessionCache {
    state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
    sessions: FxHashMap<String, ValidToken>,
    epoch: u64,
}

impl SessionCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Owner of `token` if it is cached and its deadline is after `now`.
    #[must_use]
    pub fn get(&self, token: &str, now: Timestamp) -> Option<UserId> {
        self.state
            .read()
            .sessions
            .get(token)
            .filter(|session| session.expires_at > now)
            .map(|session| session.user)
    }

    /// Seed an entry for a token that was just persisted.
    pub fn insert(&self, token: &str, session: ValidToken) {
        self.state.write().sessions.insert(token.to_owned(), session);
    }

    /// Current removal counter, to pass to [`Self::insert_unless_removed_since`].
    #[must_use]
    pub fn epoch(&self) -> CacheEpoch {
        CacheEpoch(self.state.read().epoch)
    }

    /// Insert only if nothing was removed since `since` was observed.
    ///
    /// Returns whether the entry was written.
    pub fn insert_unless_removed_since(
        &self,
        token: &str,
        session: ValidToken,
        since: CacheEpoch,
    ) -> bool {
        let mut state = self.state.write();

        if state.epoch != since.0 {
            return false;
        }

        state.sessions.insert(token.to_owned(), session);

        true
    }

    /// Drop `token` and advance the epoch.
    pub fn remove(&self, token: &str) {
        let mut state = self.state.write();

        state.sessions.remove(token);
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// Drop entries whose deadline is at or before `now`.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let mut state = self.state.write();
        let before = state.sessions.len();

        state.sessions.retain(|_, session| session.expires_at > now);

        before - state.sessions.len()
    }

    /// Number of cached entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.read().sessions.len()
    }

    /// Whether no entries are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCache")
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}
