//! A live editing session over one router's NVRAM store.
//!
//! The session fetches a backup snapshot once, layers a changeset cache
//! over it, and only talks to the transport again when the caller flushes
//! or refreshes. One session per router connection; the cache inside is
//! single-writer by design.

use nvram_backup_core::{
    decode, encode, BackupMapping, CacheError, ChangesetCache, DecodeError, EncodeError,
    PendingChanges,
};
use thiserror::Error;

use crate::transport::{Transport, TransportError};

/// Errors raised while driving a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The fetched backup did not decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The merged snapshot did not encode.
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// A key failed validation.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Snapshot-plus-changeset editing over a [`Transport`].
#[derive(Debug)]
pub struct NvramSession<T: Transport> {
    transport: T,
    cache: ChangesetCache,
}

impl<T: Transport> NvramSession<T> {
    /// Fetch and decode the initial snapshot over `transport`.
    pub fn connect(mut transport: T) -> Result<Self, SessionError> {
        let snapshot = decode(&transport.fetch_backup()?)?;
        Ok(Self {
            transport,
            cache: ChangesetCache::new(snapshot),
        })
    }

    /// The snapshot as last fetched, without pending changes.
    pub fn snapshot(&self) -> &BackupMapping {
        self.cache.snapshot()
    }

    /// Resolve `key` through pending changes, then the snapshot; missing
    /// keys read as the empty sentinel, the way `nvram get` prints nothing.
    pub fn get(&self, key: impl AsRef<[u8]>) -> &[u8] {
        self.cache.get(key)
    }

    /// Like [`NvramSession::get`], but `None` for a missing key.
    pub fn lookup(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        self.cache.lookup(key)
    }

    /// Record a pending write.
    pub fn set(
        &mut self,
        key: impl Into<Vec<u8>>,
        value: impl Into<Vec<u8>>,
    ) -> Result<(), SessionError> {
        self.cache.set(key, value)?;
        Ok(())
    }

    /// Record a pending removal.
    pub fn unset(&mut self, key: impl Into<Vec<u8>>) -> Result<(), SessionError> {
        self.cache.unset(key)?;
        Ok(())
    }

    /// Direct access to the underlying cache for table helpers.
    pub fn cache_mut(&mut self) -> &mut ChangesetCache {
        &mut self.cache
    }

    /// The pending batch, as it would be handed to the transport.
    pub fn pending(&self) -> PendingChanges {
        self.cache.changes()
    }

    /// True when any change is pending.
    pub fn has_changes(&self) -> bool {
        self.cache.has_changes()
    }

    /// Drop all pending changes without applying them.
    pub fn discard_changes(&mut self) {
        self.cache.clear_changes();
    }

    /// Apply the pending batch through the transport, then re-fetch the
    /// snapshot so the cache reflects what the router actually holds.
    pub fn flush(&mut self) -> Result<(), SessionError> {
        let pending = self.cache.changes();
        if pending.is_empty() {
            return Ok(());
        }
        self.transport.apply(&pending)?;
        self.cache.clear_changes();
        self.refresh()
    }

    /// Re-fetch the snapshot. Pending changes are kept and still shadow it.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let snapshot = decode(&self.transport.fetch_backup()?)?;
        self.cache.replace_snapshot(snapshot);
        Ok(())
    }

    /// Encode the snapshot with pending changes applied, as a full
    /// replacement backup blob.
    pub fn merged_backup(&self) -> Result<Vec<u8>, SessionError> {
        Ok(encode(&self.cache.merged_snapshot())?)
    }
}
