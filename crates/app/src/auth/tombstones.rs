//! Fingerprints whose store deletion failed but which must stay unusable.

use jiff::Timestamp;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::auth::TokenFingerprint;

#[derive(Debug, Default)]
pub(crate) struct Tombstones {
    entries: Mutex<FxHashMap<TokenFingerprint, Timestamp>>,
}

impl Tombstones {
    /// Reject `fingerprint` until `until`, the latest instant its record could still be valid.
    pub(crate) fn insert(&self, fingerprint: TokenFingerprint, until: Timestamp) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(fingerprint).or_insert(until);

        if *entry < until {
            *entry = until;
        }
    }

    pub(crate) fn contains(&self, fingerprint: &TokenFingerprint, now: Timestamp) -> bool {
        self.entries
            .lock()
            .get(fingerprint)
            .is_some_and(|until| *until > now)
    }

    /// Drop entries whose record has expired anyway.
    pub(crate) fn prune(&self, now: Timestamp) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();

        entries.retain(|_, until| *until > now);

        before - entries.len()
    }
}
