//! The command transport the NVRAM layers speak through.
//!
//! Concrete transports (SSH, serial console, web API) live outside this
//! crate. Everything the higher layers need from one is captured by two
//! primitives: fetch the raw backup blob, and apply a batch of set/unset
//! operations. Both are synchronous from the caller's viewpoint regardless
//! of how the transport is implemented internally.

use nvram_backup_core::{encode, BackupMapping, PendingChanges};
use thiserror::Error;

/// Errors surfaced by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Underlying I/O failed.
    #[error("transport I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A remote command ran but did not do what was asked.
    #[error("{0}")]
    Command(String),
}

impl TransportError {
    /// Build a command-level error from a message.
    pub fn command(message: impl Into<String>) -> Self {
        TransportError::Command(message.into())
    }
}

/// A connection to one router's NVRAM store.
pub trait Transport {
    /// Fetch the raw backup blob for the whole store.
    fn fetch_backup(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Apply a batch of pending set/unset operations.
    fn apply(&mut self, changes: &PendingChanges) -> Result<(), TransportError>;
}

/// An in-memory transport over a [`BackupMapping`].
///
/// Serves as the test double for session logic and as a dry-run backend:
/// `fetch_backup` encodes the held mapping, `apply` mutates it in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    store: BackupMapping,
}

impl MemoryTransport {
    /// Wrap a mapping as a fake router store.
    pub fn new(store: BackupMapping) -> Self {
        Self { store }
    }

    /// The current store contents.
    pub fn store(&self) -> &BackupMapping {
        &self.store
    }
}

impl Transport for MemoryTransport {
    fn fetch_backup(&mut self) -> Result<Vec<u8>, TransportError> {
        encode(&self.store).map_err(|err| TransportError::command(err.to_string()))
    }

    fn apply(&mut self, changes: &PendingChanges) -> Result<(), TransportError> {
        for (key, value) in &changes.sets {
            self.store.insert(key.clone(), value.clone());
        }
        for key in &changes.unsets {
            self.store.remove(key);
        }
        Ok(())
    }
}
