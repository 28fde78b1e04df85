//! Structured views over individual NVRAM values.
//!
//! Some keys hold whole tables packed into one text value. Each submodule
//! parses one such value into typed entities and serializes the entities
//! back to the exact textual form the firmware expects:
//!
//! - [`leases`] — static DHCP leases (`static_leases`)
//! - [`forwards`] — port-forwarding rules (`forward_spec`)
//!
//! Entities are plain value objects. Edits never touch the mapping they came
//! from; callers re-serialize and write the result back explicitly.

pub mod forwards;
pub mod leases;

use std::str;

use nvram_backup_core::BackupMapping;
use thiserror::Error;

use crate::values::ValueError;

/// Errors raised while reading or parsing a table value.
#[derive(Debug, Error)]
pub enum TableError {
    /// The backup has no entry for the table's key.
    #[error("key {key:?} is missing from the backup")]
    MissingKey { key: String },
    /// The value is not valid UTF-8 and cannot hold a table.
    #[error("value for key {key:?} is not text")]
    ValueNotText { key: String },
    /// The companion count key disagrees with the parsed table length.
    #[error("expected {expected} entries at {key:?}, parsed {actual}")]
    CountMismatch {
        key: String,
        expected: usize,
        actual: usize,
    },
    /// A record inside the value does not follow the table's format.
    #[error("malformed record {record:?}: {reason}")]
    MalformedRecord { record: String, reason: String },
    /// A field inside a record failed scalar validation.
    #[error(transparent)]
    Value(#[from] ValueError),
}

impl TableError {
    fn malformed(record: &str, reason: impl Into<String>) -> Self {
        TableError::MalformedRecord {
            record: record.to_string(),
            reason: reason.into(),
        }
    }
}

/// Fetch `key` from the mapping as text.
fn text_value<'a>(mapping: &'a BackupMapping, key: &str) -> Result<&'a str, TableError> {
    let raw = mapping.get(key).ok_or_else(|| TableError::MissingKey {
        key: key.to_string(),
    })?;
    str::from_utf8(raw).map_err(|_| TableError::ValueNotText {
        key: key.to_string(),
    })
}

/// Fetch the companion entry-count value stored at `key`.
fn entry_count(mapping: &BackupMapping, key: &str) -> Result<usize, TableError> {
    let text = text_value(mapping, key)?;
    text.trim()
        .parse()
        .map_err(|_| TableError::malformed(text, format!("entry count at {key:?} is not a number")))
}

#[cfg(test)]
mod tests {
    use nvram_backup_core::BackupMapping;

    use super::{entry_count, text_value, TableError};

    #[test]
    fn missing_and_binary_values_are_reported() {
        let mapping: BackupMapping = [(b"blob".to_vec(), vec![0xff, 0xfe])].into_iter().collect();

        assert!(matches!(
            text_value(&mapping, "absent"),
            Err(TableError::MissingKey { .. })
        ));
        assert!(matches!(
            text_value(&mapping, "blob"),
            Err(TableError::ValueNotText { .. })
        ));
    }

    #[test]
    fn entry_counts_must_be_numeric() {
        let mapping: BackupMapping = [
            (b"good".to_vec(), b" 3 ".to_vec()),
            (b"bad".to_vec(), b"three".to_vec()),
        ]
        .into_iter()
        .collect();

        assert_eq!(entry_count(&mapping, "good").unwrap(), 3);
        assert!(matches!(
            entry_count(&mapping, "bad"),
            Err(TableError::MalformedRecord { .. })
        ));
    }
}
