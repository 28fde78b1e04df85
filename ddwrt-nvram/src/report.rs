use colored::Colorize;
use nvram_backup_core::{format_summary, format_text, BackupMapping, DiffEntry, PendingChanges};

use crate::known_keys::{find_known_key, KnownKey};
use crate::tables::forwards::ForwardTable;
use crate::tables::leases::LeaseTable;

/// Render diff entries for terminal output.
pub fn render_diff(entries: &[DiffEntry]) -> String {
    let raw = format_text(entries);
    let mut out = Vec::new();

    for line in raw.lines() {
        let colored = if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('~') {
            line.yellow().to_string()
        } else {
            line.to_string()
        };
        out.push(colored);
    }

    out.join("\n")
}

/// Render summary counts for terminal output.
pub fn render_diff_summary(entries: &[DiffEntry]) -> String {
    format_summary(entries).cyan().to_string()
}

/// Render backup entries as `key=value` lines, optionally annotated with
/// known-key metadata.
pub fn render_entries(mapping: &BackupMapping, known: &[KnownKey], annotate: bool) -> String {
    let mut out = Vec::new();
    for (key, value) in mapping.iter() {
        let key = String::from_utf8_lossy(key);
        let value = String::from_utf8_lossy(value);
        let mut line = format!("{key}={value}");
        if annotate {
            if let Some(known) = find_known_key(known, &key) {
                line.push_str(
                    &format!("  # {}: {}", known.category, known.note)
                        .cyan()
                        .to_string(),
                );
            }
        }
        out.push(line);
    }
    out.join("\n")
}

/// Render the static lease table.
pub fn render_leases(table: &LeaseTable) -> String {
    let mut out = Vec::new();
    out.push(format!("static_leases count={}", table.len()));
    for lease in &table.leases {
        out.push(format!(
            "- {}: ip={} mac={}",
            lease.hostname, lease.ip, lease.mac
        ));
    }
    out.join("\n")
}

/// Render the port-forward table.
pub fn render_forwards(table: &ForwardTable) -> String {
    let mut out = Vec::new();
    out.push(format!("forward_spec count={}", table.len()));
    for forward in &table.forwards {
        let state = if forward.state.is_on() {
            "on".green().to_string()
        } else {
            "off".red().to_string()
        };
        let mut line = format!(
            "- {}: {} {} {}>{}:{}",
            forward.name,
            state,
            forward.protocol,
            forward.from_port,
            forward.to_ip,
            forward.to_port
        );
        if let Some(from_ip) = &forward.from_ip {
            line.push_str(&format!(" source={from_ip}"));
        }
        out.push(line);
    }
    out.join("\n")
}

/// Render a pending batch the way it would be applied.
pub fn render_pending(pending: &PendingChanges) -> String {
    let mut out = Vec::new();
    for (key, value) in &pending.sets {
        out.push(
            format!(
                "set {}={}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            )
            .green()
            .to_string(),
        );
    }
    for key in &pending.unsets {
        out.push(
            format!("unset {}", String::from_utf8_lossy(key))
                .red()
                .to_string(),
        );
    }
    if out.is_empty() {
        out.push("no pending changes".to_string());
    }
    out.join("\n")
}
