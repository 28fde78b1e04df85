//! Diff output formatters.

use crate::diff::DiffEntry;

/// Format diff entries as plain text.
pub fn format_text(entries: &[DiffEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    for entry in entries {
        match entry {
            DiffEntry::Identical { key } => lines.push(format!("= {key}")),
            DiffEntry::Modified { key, left, right } => {
                lines.push(format!("~ {key}"));
                lines.push(format!("  left:  {left}"));
                lines.push(format!("  right: {right}"));
            }
            DiffEntry::OnlyLeft { key, .. } => lines.push(format!("- {key}")),
            DiffEntry::OnlyRight { key, .. } => lines.push(format!("+ {key}")),
        }
    }
    lines.join("\n")
}

/// Format a simple summary of diff counts.
pub fn format_summary(entries: &[DiffEntry]) -> String {
    let mut identical = 0;
    let mut modified = 0;
    let mut only_left = 0;
    let mut only_right = 0;

    for entry in entries {
        match entry {
            DiffEntry::Identical { .. } => identical += 1,
            DiffEntry::Modified { .. } => modified += 1,
            DiffEntry::OnlyLeft { .. } => only_left += 1,
            DiffEntry::OnlyRight { .. } => only_right += 1,
        }
    }

    format!(
        "identical={identical} modified={modified} only_left={only_left} only_right={only_right}"
    )
}

/// Format diff entries as JSON.
pub fn format_json(entries: &[DiffEntry]) -> String {
    serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
}
