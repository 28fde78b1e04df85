use std::fs;

use anyhow::{anyhow, bail, Context, Result};
use ddwrt_nvram::report::render_pending;
use nvram_backup_core::{decode_file, encode, ChangesetCache};

use crate::cli::EditArgs;

/// Decode a backup, record the requested edits in a changeset cache, and
/// either print the pending batch or write the merged result as a new
/// backup.
pub fn run_edit(args: EditArgs) -> Result<()> {
    let snapshot = decode_file(&args.input)
        .with_context(|| format!("failed to decode {}", args.input.display()))?;
    let mut cache = ChangesetCache::new(snapshot);

    for spec in &args.set {
        let (key, value) = spec
            .split_once('=')
            .ok_or_else(|| anyhow!("--set expects KEY=VALUE, got {spec:?}"))?;
        cache
            .set(key, value)
            .with_context(|| format!("cannot set {key:?}"))?;
    }
    for key in &args.unset {
        cache
            .unset(key.as_str())
            .with_context(|| format!("cannot unset {key:?}"))?;
    }

    let pending = cache.changes();
    if args.dry_run {
        println!("{}", render_pending(&pending));
        println!(
            "pending sets={} unsets={}",
            pending.sets.len(),
            pending.unsets.len()
        );
        return Ok(());
    }

    let Some(output) = args.output else {
        bail!("either --output or --dry-run is required");
    };

    let merged = cache.merged_snapshot();
    let bytes = encode(&merged).context("failed to encode the edited backup")?;
    fs::write(&output, bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "wrote {} entries to {} (sets={} unsets={})",
        merged.len(),
        output.display(),
        pending.sets.len(),
        pending.unsets.len()
    );

    Ok(())
}
