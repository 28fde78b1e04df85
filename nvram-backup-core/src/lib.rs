//! Generic codec and editing primitives for router NVRAM backup blobs.
//!
//! The backup format is a fixed header tag, a little-endian u16 entry count,
//! and a run of length-prefixed key/value entries. This crate decodes that
//! blob into an insertion-ordered [`BackupMapping`], layers pending edits
//! over it with [`ChangesetCache`], and diffs mappings into either display
//! entries or a minimal set/unset batch. All firmware-specific knowledge
//! (key names, table value formats, transports) lives in higher-level
//! crates.

pub mod cache;
pub mod codec;
pub mod diff;
pub mod format;
pub mod mapping;

pub use cache::{CacheError, Change, ChangesetCache, PendingChanges};
pub use codec::{
    decode, decode_file, decode_with_options, encode, encode_file, encode_with_header, DecodeError,
    DecodeOptions, DuplicateKeyPolicy, EncodeError, DEFAULT_HEADER, MAX_KEY_LEN, MAX_VALUE_LEN,
};
pub use diff::{changes_between, diff, diff_with_options, DiffEntry, DiffOptions};
pub use format::{format_json, format_summary, format_text};
pub use mapping::{is_valid_key, BackupMapping};
