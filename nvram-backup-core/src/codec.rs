use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::mapping::BackupMapping;

/// Header tag emitted by `nvram backup` on DD-WRT firmware.
pub const DEFAULT_HEADER: &[u8] = b"DD-WRT";

/// Largest encodable key, bounded by the one-byte length prefix.
pub const MAX_KEY_LEN: usize = u8::MAX as usize;

/// Largest encodable value, bounded by the two-byte length prefix.
pub const MAX_VALUE_LEN: usize = u16::MAX as usize;

/// How the decoder treats a key that appears more than once in a stream.
///
/// Firmware-produced backups do contain duplicates; the router itself keeps
/// the last write, so that is the default here. `Reject` is for callers that
/// want to surface the duplication instead of papering over it. The default
/// is never first-write-wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Later occurrences replace earlier ones (firmware behavior).
    #[default]
    KeepLast,
    /// Fail with [`DecodeError::DuplicateKey`] on the second occurrence.
    Reject,
}

/// Configures backup decode behavior.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Duplicate-key policy, [`DuplicateKeyPolicy::KeepLast`] by default.
    pub duplicates: DuplicateKeyPolicy,
}

/// Errors that can occur while decoding a backup blob.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Stream does not start with the expected header tag.
    #[error("expected backup header {expected:?}, found {found:?}")]
    HeaderMismatch { expected: String, found: String },
    /// Stream ended inside a length-prefixed field.
    #[error("backup stream truncated at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },
    /// Declared entry count disagrees with the entries actually present.
    #[error("backup declared {declared} entries but {actual} were decoded")]
    CountMismatch { declared: usize, actual: usize },
    /// A key occurred twice and the policy was [`DuplicateKeyPolicy::Reject`].
    #[error("duplicate key {key:?}: first value {first:?}, second value {second:?}")]
    DuplicateKey {
        key: String,
        first: String,
        second: String,
    },
    /// Failed to read a backup file.
    #[error("failed to read backup file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while encoding a mapping into a backup blob.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A key or value exceeds its length-prefix maximum.
    #[error("{field} for key {key:?} is {len} bytes, format limit is {limit}")]
    FieldTooLong {
        field: &'static str,
        key: String,
        len: usize,
        limit: usize,
    },
    /// The mapping holds more entries than the two-byte count can declare.
    #[error("mapping holds {count} entries, format limit is {limit}")]
    TooManyEntries { count: usize, limit: usize },
    /// Failed to write a backup file.
    #[error("failed to write backup file: {0}")]
    Io(#[from] std::io::Error),
}

/// Decode a backup blob with the default header and options.
pub fn decode(data: &[u8]) -> Result<BackupMapping, DecodeError> {
    decode_with_options(data, DEFAULT_HEADER, &DecodeOptions::default())
}

/// Decode a backup blob with a custom header tag and options.
///
/// Layout, after the header: a little-endian u16 entry count, then for each
/// entry a one-byte key length, the key, a little-endian u16 value length,
/// and the value. The stream must end exactly on an entry boundary and the
/// declared count must match the number of entries collected.
pub fn decode_with_options(
    data: &[u8],
    header: &[u8],
    opts: &DecodeOptions,
) -> Result<BackupMapping, DecodeError> {
    let found = read_bytes(data, 0, header.len())?;
    if found != header {
        return Err(DecodeError::HeaderMismatch {
            expected: String::from_utf8_lossy(header).into_owned(),
            found: String::from_utf8_lossy(found).into_owned(),
        });
    }

    let declared = read_u16(data, header.len())? as usize;
    let mut pos = header.len() + 2;
    let mut mapping = BackupMapping::new();

    while pos < data.len() {
        let key_len = read_u8(data, pos)? as usize;
        pos += 1;

        let key = read_bytes(data, pos, key_len)?;
        pos += key_len;

        let value_len = read_u16(data, pos)? as usize;
        pos += 2;

        let value = read_bytes(data, pos, value_len)?;
        pos += value_len;

        if opts.duplicates == DuplicateKeyPolicy::Reject {
            if let Some(first) = mapping.get(key) {
                return Err(DecodeError::DuplicateKey {
                    key: String::from_utf8_lossy(key).into_owned(),
                    first: String::from_utf8_lossy(first).into_owned(),
                    second: String::from_utf8_lossy(value).into_owned(),
                });
            }
        }
        mapping.insert(key.to_vec(), value.to_vec());
    }

    if mapping.len() != declared {
        return Err(DecodeError::CountMismatch {
            declared,
            actual: mapping.len(),
        });
    }

    Ok(mapping)
}

/// Decode a backup file with the default header and options.
pub fn decode_file(path: &Path) -> Result<BackupMapping, DecodeError> {
    let data = fs::read(path)?;
    decode(&data)
}

/// Encode a mapping into a backup blob with the default header.
pub fn encode(mapping: &BackupMapping) -> Result<Vec<u8>, EncodeError> {
    encode_with_header(mapping, DEFAULT_HEADER)
}

/// Encode a mapping into a backup blob with a custom header tag.
///
/// Entries are written in mapping order. An oversized key, value, or entry
/// count is the caller's error; nothing is silently truncated.
pub fn encode_with_header(mapping: &BackupMapping, header: &[u8]) -> Result<Vec<u8>, EncodeError> {
    if mapping.len() > u16::MAX as usize {
        return Err(EncodeError::TooManyEntries {
            count: mapping.len(),
            limit: u16::MAX as usize,
        });
    }

    let mut out = Vec::with_capacity(header.len() + 2 + mapping.len() * 8);
    out.extend_from_slice(header);
    out.extend_from_slice(&(mapping.len() as u16).to_le_bytes());

    for (key, value) in mapping.iter() {
        if key.len() > MAX_KEY_LEN {
            return Err(field_too_long("key", key, key.len(), MAX_KEY_LEN));
        }
        if value.len() > MAX_VALUE_LEN {
            return Err(field_too_long("value", key, value.len(), MAX_VALUE_LEN));
        }

        out.push(key.len() as u8);
        out.extend_from_slice(key);
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        out.extend_from_slice(value);
    }

    Ok(out)
}

/// Encode a mapping and write it to `path`.
pub fn encode_file(mapping: &BackupMapping, path: &Path) -> Result<(), EncodeError> {
    let bytes = encode(mapping)?;
    fs::write(path, bytes)?;
    Ok(())
}

fn field_too_long(field: &'static str, key: &[u8], len: usize, limit: usize) -> EncodeError {
    EncodeError::FieldTooLong {
        field,
        key: String::from_utf8_lossy(key).into_owned(),
        len,
        limit,
    }
}

fn read_u8(data: &[u8], pos: usize) -> Result<u8, DecodeError> {
    Ok(read_bytes(data, pos, 1)?[0])
}

fn read_u16(data: &[u8], pos: usize) -> Result<u16, DecodeError> {
    let bytes = read_bytes(data, pos, 2)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_bytes(data: &[u8], pos: usize, len: usize) -> Result<&[u8], DecodeError> {
    let end = pos.checked_add(len).filter(|end| *end <= data.len());
    match end {
        Some(end) => Ok(&data[pos..end]),
        None => Err(DecodeError::Truncated {
            offset: pos,
            needed: len,
            available: data.len().saturating_sub(pos),
        }),
    }
}
