use serde::Serialize;

use crate::cache::PendingChanges;
use crate::mapping::BackupMapping;

/// Configures mapping diff behavior.
#[derive(Debug, Clone, Default)]
pub struct DiffOptions {
    /// Include [`DiffEntry::Identical`] rows.
    pub include_identical: bool,
}

/// A single diff outcome for a key.
///
/// Values are decoded lossily for display; use [`changes_between`] when the
/// raw bytes matter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DiffEntry {
    /// Key exists in both with identical bytes.
    Identical { key: String },
    /// Key exists in both but the values differ.
    Modified {
        key: String,
        left: String,
        right: String,
    },
    /// Key only in the left mapping.
    OnlyLeft { key: String, value: String },
    /// Key only in the right mapping.
    OnlyRight { key: String, value: String },
}

/// Diff two mappings with default options.
pub fn diff(left: &BackupMapping, right: &BackupMapping) -> Vec<DiffEntry> {
    diff_with_options(left, right, &DiffOptions::default())
}

/// Diff two mappings with custom options.
///
/// Entries follow the left mapping's order, then right-only keys in the
/// right mapping's order.
pub fn diff_with_options(
    left: &BackupMapping,
    right: &BackupMapping,
    opts: &DiffOptions,
) -> Vec<DiffEntry> {
    let mut out = Vec::new();

    for (key, left_value) in left.iter() {
        match right.get(key) {
            Some(right_value) if right_value == left_value => {
                if opts.include_identical {
                    out.push(DiffEntry::Identical { key: lossy(key) });
                }
            }
            Some(right_value) => out.push(DiffEntry::Modified {
                key: lossy(key),
                left: lossy(left_value),
                right: lossy(right_value),
            }),
            None => out.push(DiffEntry::OnlyLeft {
                key: lossy(key),
                value: lossy(left_value),
            }),
        }
    }

    for (key, value) in right.iter() {
        if !left.contains_key(key) {
            out.push(DiffEntry::OnlyRight {
                key: lossy(key),
                value: lossy(value),
            });
        }
    }

    out
}

/// The minimal set/unset batch that rewrites `current` into `desired`.
///
/// Applying the returned batch to a store holding `current` leaves it equal
/// to `desired` up to entry order.
pub fn changes_between(current: &BackupMapping, desired: &BackupMapping) -> PendingChanges {
    let mut pending = PendingChanges::default();

    for (key, value) in desired.iter() {
        if current.get(key) != Some(value) {
            pending.sets.insert(key.to_vec(), value.to_vec());
        }
    }
    for key in current.keys() {
        if !desired.contains_key(key) {
            pending.unsets.insert(key.to_vec());
        }
    }

    pending
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
