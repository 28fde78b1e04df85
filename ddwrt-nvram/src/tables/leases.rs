//! The static DHCP lease table stored at `static_leases`.
//!
//! Value format: records separated by a single space, each record
//! `mac=hostname=ip=`. The firmware writes a trailing `=` on every record
//! and a trailing space after the last one; both are reproduced here. The
//! companion key `static_leasenum` holds the entry count.

use std::net::IpAddr;

use nvram_backup_core::{BackupMapping, CacheError, ChangesetCache};
use serde::Serialize;

use super::{entry_count, text_value, TableError};
use crate::values::MacAddress;

/// Key holding the packed lease table.
pub const STATIC_LEASES_KEY: &str = "static_leases";

/// Companion key holding the lease count.
pub const STATIC_LEASE_COUNT_KEY: &str = "static_leasenum";

/// One fixed hardware-address-to-IP assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lease {
    pub mac: MacAddress,
    pub hostname: String,
    pub ip: IpAddr,
}

impl Lease {
    /// Build a lease from its parts.
    pub fn new(mac: MacAddress, hostname: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            mac,
            hostname: hostname.into(),
            ip,
        }
    }

    /// Parse one `mac=hostname=ip=` record.
    ///
    /// Only the first two `=` are structural; the split is bounded so a
    /// hostname can never swallow the address field. A chunk with fewer
    /// than three parts is dropped (`Ok(None)`) rather than rejected — the
    /// firmware emits such fragments around the record separator and the
    /// original tooling has always ignored them. A chunk that does have
    /// three parts must carry a valid address on both ends.
    pub fn from_record(record: &str) -> Result<Option<Self>, TableError> {
        let parts: Vec<&str> = record.splitn(4, '=').collect();
        if parts.len() < 3 {
            return Ok(None);
        }

        let mac: MacAddress = parts[0].parse()?;
        let ip: IpAddr = parts[2]
            .parse()
            .map_err(|_| TableError::malformed(record, "invalid IP address"))?;
        Ok(Some(Self::new(mac, parts[1], ip)))
    }

    /// Render the record, trailing `=` included.
    pub fn to_record(&self) -> String {
        format!("{}={}={}=", self.mac, self.hostname, self.ip)
    }
}

/// The ordered lease table behind one `static_leases` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LeaseTable {
    pub leases: Vec<Lease>,
}

impl LeaseTable {
    /// Parse a packed `static_leases` value.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut leases = Vec::new();
        for chunk in text.split(' ') {
            if let Some(lease) = Lease::from_record(chunk)? {
                leases.push(lease);
            }
        }
        Ok(Self { leases })
    }

    /// Read the table out of a decoded backup.
    ///
    /// With `check_entries`, the parsed length is validated against
    /// `static_leasenum`.
    pub fn from_mapping(mapping: &BackupMapping, check_entries: bool) -> Result<Self, TableError> {
        let table = Self::parse(text_value(mapping, STATIC_LEASES_KEY)?)?;
        if check_entries {
            let expected = entry_count(mapping, STATIC_LEASE_COUNT_KEY)?;
            if expected != table.leases.len() {
                return Err(TableError::CountMismatch {
                    key: STATIC_LEASES_KEY.to_string(),
                    expected,
                    actual: table.leases.len(),
                });
            }
        }
        Ok(table)
    }

    /// Render the packed value, trailing space included.
    pub fn to_value(&self) -> String {
        let mut out = String::new();
        for lease in &self.leases {
            out.push_str(&lease.to_record());
            out.push(' ');
        }
        out
    }

    /// Record the table and its count key as pending cache writes.
    pub fn write_to_cache(&self, cache: &mut ChangesetCache) -> Result<(), CacheError> {
        cache.set(STATIC_LEASES_KEY, self.to_value())?;
        cache.set(STATIC_LEASE_COUNT_KEY, self.leases.len().to_string())?;
        Ok(())
    }

    /// Number of leases.
    pub fn len(&self) -> usize {
        self.leases.len()
    }

    /// True when the table holds no leases.
    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}
