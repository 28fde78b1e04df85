//! DD-WRT NVRAM backup inspection and editing.
//!
//! DD-WRT routers keep their whole configuration in a flat key/value NVRAM
//! store and serialize it as one compact binary blob. This library reads and
//! rewrites that blob, exposes structured views over the packed table values
//! inside it, and batches edits for application over a pluggable transport.
//!
//! # Architecture
//!
//! The library is organized into several functional areas:
//!
//! ## Scalar values
//!
//! - [`values`] — Validated wrappers for hardware addresses, on/off states,
//!   ports, and protocol selectors
//! - [`escape`] — Entity escaping for free-text rule names
//!
//! ## Structured tables
//!
//! - [`tables::leases`] — Static DHCP lease table (`static_leases`)
//! - [`tables::forwards`] — Port-forwarding table (`forward_spec`)
//!
//! ## Router access
//!
//! - [`transport`] — The two-primitive seam concrete transports implement
//! - [`session`] — Snapshot-plus-changeset editing over a transport
//!
//! ## Reporting
//!
//! - [`report`] — Terminal-friendly colored output
//! - [`known_keys`] — Annotations for recognized NVRAM keys
//!
//! # Workflow
//!
//! The typical editing workflow:
//!
//! 1. **Decode** a backup blob (or connect a session to a live router)
//! 2. **Parse** the table values of interest into typed entities
//! 3. **Edit** the entities in place
//! 4. **Serialize** them back and record the writes in the changeset cache
//! 5. **Apply** either the pending batch or a full replacement backup
//!
//! # Examples
//!
//! ```ignore
//! use ddwrt_nvram::session::NvramSession;
//! use ddwrt_nvram::tables::leases::LeaseTable;
//!
//! let mut session = NvramSession::connect(transport)?;
//! let mut leases = LeaseTable::from_mapping(session.snapshot(), true)?;
//! leases.leases.retain(|lease| lease.hostname != "old-printer");
//! leases.write_to_cache(session.cache_mut())?;
//! session.flush()?;
//! ```
//!
//! # Built on nvram-backup-core
//!
//! This library uses `nvram-backup-core` for the generic backup codec,
//! ordered mapping, changeset cache, and diffing. All DD-WRT-specific
//! knowledge is contained in this crate.

pub mod escape;
pub mod known_keys;
pub mod report;
pub mod session;
pub mod tables;
pub mod transport;
pub mod values;
