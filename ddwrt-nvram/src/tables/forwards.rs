//! The port-forwarding table stored at `forward_spec`.
//!
//! One record is
//! `escaped_name:state:protocol:from_port>to_ip:to_port` with an optional
//! `<from_ip` suffix restricting the source. Rule names are entity-escaped
//! (see [`crate::escape`]) so the record's own delimiters stay unambiguous.
//! The firmware serializes records back to back with no separator but
//! accepts space-separated values; parsing here skips empty chunks so both
//! shapes load. The companion key `forwardspec_entries` holds the count.

use std::fmt::{self, Display, Formatter};
use std::net::IpAddr;
use std::str::FromStr;

use nvram_backup_core::{BackupMapping, CacheError, ChangesetCache};
use serde::Serialize;

use super::{entry_count, text_value, TableError};
use crate::escape::{escape_name, unescape_name};
use crate::values::{Port, Protocol, State, ValueError};

/// Key holding the packed forward table.
pub const FORWARD_SPEC_KEY: &str = "forward_spec";

/// Companion key holding the forward count.
pub const FORWARD_COUNT_KEY: &str = "forwardspec_entries";

/// Source restriction on a forwarding rule: one host or a whole network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRestriction {
    /// A single source address.
    Address(IpAddr),
    /// An `address/prefix` network range.
    Network { address: IpAddr, prefix: u8 },
}

impl SourceRestriction {
    /// Parse a bare address first, falling back to the `address/prefix`
    /// network form.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        if let Ok(address) = text.parse::<IpAddr>() {
            return Ok(SourceRestriction::Address(address));
        }

        let (address, prefix) = text
            .split_once('/')
            .ok_or_else(|| ValueError::InvalidAddress {
                value: text.to_string(),
            })?;
        let address: IpAddr = address.parse().map_err(|_| ValueError::InvalidAddress {
            value: text.to_string(),
        })?;
        let max = if address.is_ipv4() { 32 } else { 128 };
        let prefix: u8 = prefix.parse().map_err(|_| ValueError::InvalidAddress {
            value: text.to_string(),
        })?;
        if prefix > max {
            return Err(ValueError::OutOfRange {
                field: "network prefix",
                value: prefix.to_string(),
                min: 0,
                max: max as u64,
            });
        }
        Ok(SourceRestriction::Network { address, prefix })
    }
}

impl FromStr for SourceRestriction {
    type Err = ValueError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl Display for SourceRestriction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SourceRestriction::Address(address) => write!(f, "{address}"),
            SourceRestriction::Network { address, prefix } => write!(f, "{address}/{prefix}"),
        }
    }
}

impl Serialize for SourceRestriction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One port-forwarding rule.
///
/// `name` is held unescaped; escaping happens at the record boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortForward {
    pub name: String,
    pub state: State,
    pub protocol: Protocol,
    pub from_port: Port,
    pub to_ip: IpAddr,
    pub to_port: Port,
    pub from_ip: Option<SourceRestriction>,
}

impl PortForward {
    /// Parse one encoded record.
    pub fn from_record(record: &str) -> Result<Self, TableError> {
        let fields: Vec<&str> = record.split(':').collect();
        if fields.len() != 5 {
            return Err(TableError::malformed(
                record,
                format!("expected 5 colon-delimited fields, got {}", fields.len()),
            ));
        }

        let (from_port, to_ip) = fields[3].split_once('>').ok_or_else(|| {
            TableError::malformed(record, "missing '>' between source port and destination")
        })?;
        let (to_port, from_ip) = match fields[4].split_once('<') {
            Some((to_port, from_ip)) => (to_port, Some(from_ip)),
            None => (fields[4], None),
        };

        Ok(Self {
            name: unescape_name(fields[0]),
            state: fields[1].parse()?,
            protocol: fields[2].parse()?,
            from_port: from_port.parse()?,
            to_ip: to_ip
                .parse()
                .map_err(|_| TableError::malformed(record, "invalid destination address"))?,
            to_port: to_port.parse()?,
            from_ip: from_ip.map(SourceRestriction::parse).transpose()?,
        })
    }

    /// Render the record, escaping the name and omitting the source suffix
    /// when there is no restriction.
    pub fn to_record(&self) -> String {
        let mut out = format!(
            "{}:{}:{}:{}>{}:{}",
            escape_name(&self.name),
            self.state,
            self.protocol,
            self.from_port,
            self.to_ip,
            self.to_port
        );
        if let Some(from_ip) = &self.from_ip {
            out.push('<');
            out.push_str(&from_ip.to_string());
        }
        out
    }
}

/// The ordered forward table behind one `forward_spec` value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ForwardTable {
    pub forwards: Vec<PortForward>,
}

impl ForwardTable {
    /// Parse a packed `forward_spec` value.
    ///
    /// Any malformed non-empty record is an error; there is no lenient drop
    /// policy here, unlike the lease table.
    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut forwards = Vec::new();
        for chunk in text.split(' ') {
            if chunk.is_empty() {
                continue;
            }
            forwards.push(PortForward::from_record(chunk)?);
        }
        Ok(Self { forwards })
    }

    /// Read the table out of a decoded backup.
    ///
    /// With `check_entries`, the parsed length is validated against
    /// `forwardspec_entries`.
    pub fn from_mapping(mapping: &BackupMapping, check_entries: bool) -> Result<Self, TableError> {
        let table = Self::parse(text_value(mapping, FORWARD_SPEC_KEY)?)?;
        if check_entries {
            let expected = entry_count(mapping, FORWARD_COUNT_KEY)?;
            if expected != table.forwards.len() {
                return Err(TableError::CountMismatch {
                    key: FORWARD_SPEC_KEY.to_string(),
                    expected,
                    actual: table.forwards.len(),
                });
            }
        }
        Ok(table)
    }

    /// Render the packed value: records concatenated with no separator,
    /// exactly as the firmware's serializer writes them.
    pub fn to_value(&self) -> String {
        self.forwards.iter().map(PortForward::to_record).collect()
    }

    /// Record the table and its count key as pending cache writes.
    pub fn write_to_cache(&self, cache: &mut ChangesetCache) -> Result<(), CacheError> {
        cache.set(FORWARD_SPEC_KEY, self.to_value())?;
        cache.set(FORWARD_COUNT_KEY, self.forwards.len().to_string())?;
        Ok(())
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.forwards.len()
    }

    /// True when the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.forwards.is_empty()
    }
}
