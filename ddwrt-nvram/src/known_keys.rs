use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Annotation metadata for a recognized NVRAM key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KnownKey {
    pub key: String,
    pub category: String,
    pub note: String,
}

#[derive(Debug, Deserialize)]
struct KnownKeyFile {
    key: Vec<KnownKey>,
}

/// Errors returned when loading key annotation files.
#[derive(Debug, Error)]
pub enum KnownKeyLoadError {
    #[error("failed to read key annotations file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse key annotations file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Load key annotations from a TOML file.
pub fn load_known_keys(path: &Path) -> Result<Vec<KnownKey>, KnownKeyLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| KnownKeyLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_known_keys(&raw, path.display().to_string())
}

/// Built-in fallback annotations.
pub fn default_known_keys() -> Vec<KnownKey> {
    let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/keys/known_keys.toml"));
    match parse_known_keys(embedded, "embedded annotations".to_string()) {
        Ok(keys) if !keys.is_empty() => keys,
        _ => fallback_known_keys(),
    }
}

/// Find the annotation for `key`, if one is known.
pub fn find_known_key<'a>(keys: &'a [KnownKey], key: &str) -> Option<&'a KnownKey> {
    keys.iter().find(|known| known.key == key)
}

fn parse_known_keys(raw: &str, path: String) -> Result<Vec<KnownKey>, KnownKeyLoadError> {
    let parsed: KnownKeyFile =
        toml::from_str(raw).map_err(|source| KnownKeyLoadError::Parse { path, source })?;
    Ok(parsed.key)
}

fn fallback_known_keys() -> Vec<KnownKey> {
    vec![
        KnownKey {
            key: "static_leases".to_string(),
            category: "dhcp".to_string(),
            note: "packed static lease table, one mac=hostname=ip= record per lease".to_string(),
        },
        KnownKey {
            key: "static_leasenum".to_string(),
            category: "dhcp".to_string(),
            note: "entry count companion for static_leases".to_string(),
        },
        KnownKey {
            key: "forward_spec".to_string(),
            category: "nat".to_string(),
            note: "packed port-forward table with entity-escaped rule names".to_string(),
        },
        KnownKey {
            key: "forwardspec_entries".to_string(),
            category: "nat".to_string(),
            note: "entry count companion for forward_spec".to_string(),
        },
        KnownKey {
            key: "lan_ipaddr".to_string(),
            category: "network".to_string(),
            note: "LAN-side address of the router itself".to_string(),
        },
        KnownKey {
            key: "wan_proto".to_string(),
            category: "network".to_string(),
            note: "WAN connection mode (dhcp, static, pppoe, ...)".to_string(),
        },
    ]
}
