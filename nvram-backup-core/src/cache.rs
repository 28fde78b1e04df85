use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

use crate::mapping::{is_valid_key, BackupMapping};

/// One pending mutation recorded against a snapshot key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Replace the key's value.
    Set(Vec<u8>),
    /// Treat the key as absent (tombstone).
    Unset,
}

/// A materialized batch of pending mutations, ready for a transport.
///
/// `sets` and `unsets` are disjoint: a key carries at most one pending
/// change, last write wins. Order within each collection follows the order
/// the changes were first recorded, but no cross-key ordering is promised
/// beyond that — the changeset is a mapping, not a log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChanges {
    /// Keys to write with their replacement values.
    pub sets: IndexMap<Vec<u8>, Vec<u8>>,
    /// Keys to remove.
    pub unsets: IndexSet<Vec<u8>>,
}

impl PendingChanges {
    /// True when there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty() && self.unsets.is_empty()
    }

    /// Total number of pending operations.
    pub fn len(&self) -> usize {
        self.sets.len() + self.unsets.len()
    }
}

/// Errors raised when recording changes.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Key is empty or contains `=` and would be misread by the router.
    #[error("{key:?} is not a valid key, try removing the '='")]
    InvalidKey { key: String },
}

/// A changeset layered over a backup snapshot.
///
/// Reads resolve against pending changes first, then the snapshot. Writes
/// only record intent; nothing touches a transport until the caller hands
/// [`ChangesetCache::changes`] or [`ChangesetCache::merged_snapshot`] to one.
/// The cache assumes a single writer; callers needing concurrent access must
/// serialize it externally, one cache per logical session.
#[derive(Debug, Clone)]
pub struct ChangesetCache {
    snapshot: BackupMapping,
    changes: IndexMap<Vec<u8>, Change>,
    sentinel: Vec<u8>,
}

impl ChangesetCache {
    /// Wrap a snapshot with an empty changeset.
    ///
    /// The "not found" sentinel defaults to the empty byte string, matching
    /// what `nvram get` prints for a missing key.
    pub fn new(snapshot: BackupMapping) -> Self {
        Self::with_sentinel(snapshot, Vec::new())
    }

    /// Wrap a snapshot, resolving missing keys to `sentinel`.
    pub fn with_sentinel(snapshot: BackupMapping, sentinel: Vec<u8>) -> Self {
        Self {
            snapshot,
            changes: IndexMap::new(),
            sentinel,
        }
    }

    /// The underlying snapshot, without pending changes.
    pub fn snapshot(&self) -> &BackupMapping {
        &self.snapshot
    }

    /// Resolve `key` against pending changes, then the snapshot.
    ///
    /// Returns `None` for a tombstoned or absent key.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        let key = key.as_ref();
        match self.changes.get(key) {
            Some(Change::Set(value)) => Some(value.as_slice()),
            Some(Change::Unset) => None,
            None => self.snapshot.get(key),
        }
    }

    /// Like [`ChangesetCache::lookup`], but missing keys resolve to the
    /// configured sentinel.
    pub fn get(&self, key: impl AsRef<[u8]>) -> &[u8] {
        self.lookup(key).unwrap_or(&self.sentinel)
    }

    /// Record a pending write for `key`.
    pub fn set(
        &mut self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<(), CacheError> {
        let key = key.into();
        validate_key(&key)?;
        self.changes.insert(key, Change::Set(value.into()));
        Ok(())
    }

    /// Record a pending removal for `key`.
    ///
    /// Unsetting a key the snapshot never held is not an error; the router
    /// treats `nvram unset` of an unknown key as a no-op.
    pub fn unset(&mut self, key: impl Into<Vec<u8>>) -> Result<(), CacheError> {
        let key = key.into();
        validate_key(&key)?;
        self.changes.insert(key, Change::Unset);
        Ok(())
    }

    /// True when any change is pending.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Materialize the pending changeset for batch application.
    pub fn changes(&self) -> PendingChanges {
        let mut pending = PendingChanges::default();
        for (key, change) in &self.changes {
            match change {
                Change::Set(value) => {
                    pending.sets.insert(key.clone(), value.clone());
                }
                Change::Unset => {
                    pending.unsets.insert(key.clone());
                }
            }
        }
        pending
    }

    /// Snapshot with the changeset applied: sets overwrite or append, unsets
    /// remove. Used to produce a full replacement backup instead of an
    /// incremental batch.
    pub fn merged_snapshot(&self) -> BackupMapping {
        let mut merged = self.snapshot.clone();
        for (key, change) in &self.changes {
            match change {
                Change::Set(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Change::Unset => {
                    merged.remove(key);
                }
            }
        }
        merged
    }

    /// Drop all pending changes.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Swap the base snapshot. The changeset is untouched; callers wanting a
    /// fresh baseline clear it first.
    pub fn replace_snapshot(&mut self, snapshot: BackupMapping) {
        self.snapshot = snapshot;
    }
}

fn validate_key(key: &[u8]) -> Result<(), CacheError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(CacheError::InvalidKey {
            key: String::from_utf8_lossy(key).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{CacheError, ChangesetCache};
    use crate::mapping::BackupMapping;

    fn snapshot() -> BackupMapping {
        [
            (b"a".to_vec(), b"old".to_vec()),
            (b"b".to_vec(), b"kept".to_vec()),
            (b"c".to_vec(), b"untouched".to_vec()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn pending_set_shadows_snapshot() {
        let mut cache = ChangesetCache::new(snapshot());
        cache.set("a", "1").expect("set");

        assert_eq!(cache.get("a"), b"1");
        assert_eq!(cache.snapshot().get("a"), Some(b"old".as_slice()));
    }

    #[test]
    fn tombstone_resolves_to_sentinel() {
        let mut cache = ChangesetCache::new(snapshot());
        cache.unset("b").expect("unset");

        assert_eq!(cache.get("b"), b"");
        assert_eq!(cache.lookup("b"), None);
        assert_eq!(cache.get("never_set"), b"");
    }

    #[test]
    fn sentinel_is_configurable() {
        let cache = ChangesetCache::with_sentinel(snapshot(), b"<missing>".to_vec());
        assert_eq!(cache.get("nope"), b"<missing>");
    }

    #[test]
    fn merged_snapshot_applies_sets_and_unsets() {
        let mut cache = ChangesetCache::new(snapshot());
        cache.set("a", "1").expect("set");
        cache.unset("b").expect("unset");
        cache.set("new", "2").expect("set");

        let merged = cache.merged_snapshot();
        assert_eq!(merged.get("a"), Some(b"1".as_slice()));
        assert_eq!(merged.get("b"), None);
        assert_eq!(merged.get("c"), Some(b"untouched".as_slice()));
        assert_eq!(merged.get("new"), Some(b"2".as_slice()));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn last_write_per_key_wins() {
        let mut cache = ChangesetCache::new(snapshot());
        cache.set("a", "1").expect("set");
        cache.unset("a").expect("unset");

        let pending = cache.changes();
        assert!(pending.sets.is_empty());
        assert!(pending.unsets.contains(b"a".as_slice()));

        cache.set("a", "2").expect("set");
        let pending = cache.changes();
        assert_eq!(pending.sets.get(b"a".as_slice()), Some(&b"2".to_vec()));
        assert!(pending.unsets.is_empty());
    }

    #[test]
    fn invalid_key_fails_before_recording() {
        let mut cache = ChangesetCache::new(snapshot());

        let err = cache.set("is this = to my ip", "yes").expect_err("set");
        assert!(matches!(err, CacheError::InvalidKey { .. }));
        let err = cache.unset("====").expect_err("unset");
        assert!(matches!(err, CacheError::InvalidKey { .. }));
        assert!(!cache.has_changes());
    }

    #[test]
    fn replace_snapshot_keeps_changeset() {
        let mut cache = ChangesetCache::new(snapshot());
        cache.set("a", "1").expect("set");

        cache.replace_snapshot([(b"z".to_vec(), b"9".to_vec())].into_iter().collect());
        assert_eq!(cache.get("a"), b"1");
        assert_eq!(cache.get("z"), b"9");
        assert!(cache.has_changes());
    }
}
