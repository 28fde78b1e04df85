use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use ddwrt_nvram::known_keys::{default_known_keys, find_known_key, load_known_keys, KnownKey};
use ddwrt_nvram::report::{
    render_diff, render_diff_summary, render_entries, render_forwards, render_leases,
};
use ddwrt_nvram::tables::forwards::ForwardTable;
use ddwrt_nvram::tables::leases::LeaseTable;
use nvram_backup_core::{
    decode_file, decode_with_options, diff_with_options, format_json, BackupMapping,
    DecodeOptions, DiffOptions, DuplicateKeyPolicy, DEFAULT_HEADER,
};

mod cli;
mod edit_cmd;

use cli::{Cli, Command, DiffArgs, ForwardsArgs, InspectArgs, LeasesArgs, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(args) => run_inspect(args),
        Command::Diff(args) => run_diff(args),
        Command::Leases(args) => run_leases(args),
        Command::Forwards(args) => run_forwards(args),
        Command::Edit(args) => edit_cmd::run_edit(args),
    }
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let data = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let opts = DecodeOptions {
        duplicates: if args.strict_duplicates {
            DuplicateKeyPolicy::Reject
        } else {
            DuplicateKeyPolicy::KeepLast
        },
    };
    let mapping = decode_with_options(&data, DEFAULT_HEADER, &opts)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    let mapping = filter_entries(mapping, &args.key, args.prefix.as_deref());
    let known = resolve_known_keys(args.keys_file.as_deref());

    match args.format {
        OutputFormat::Text => {
            println!("{}", render_entries(&mapping, &known, args.known));
            println!("entries={}", mapping.len());
        }
        OutputFormat::Json => {
            let rows: Vec<EntryRow> = mapping
                .iter()
                .map(|(key, value)| {
                    let key = String::from_utf8_lossy(key).into_owned();
                    let annotation = find_known_key(&known, &key);
                    EntryRow {
                        value: String::from_utf8_lossy(value).into_owned(),
                        category: annotation.map(|a| a.category.clone()),
                        note: annotation.map(|a| a.note.clone()),
                        key,
                    }
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

fn run_diff(args: DiffArgs) -> Result<()> {
    let left = decode_file(&args.file1)
        .with_context(|| format!("failed to decode {}", args.file1.display()))?;
    let right = decode_file(&args.file2)
        .with_context(|| format!("failed to decode {}", args.file2.display()))?;

    let opts = DiffOptions {
        include_identical: args.verbose,
    };
    let entries = diff_with_options(&left, &right, &opts);

    if args.summary {
        println!("{}", render_diff_summary(&entries));
        return Ok(());
    }

    match args.format {
        OutputFormat::Text => {
            println!("{}", render_diff(&entries));
            println!("{}", render_diff_summary(&entries));
        }
        OutputFormat::Json => println!("{}", format_json(&entries)),
    }

    Ok(())
}

fn run_leases(args: LeasesArgs) -> Result<()> {
    let mapping = decode_file(&args.file)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    let table = LeaseTable::from_mapping(&mapping, !args.no_check_count)
        .context("failed to read the static lease table")?;

    match args.format {
        OutputFormat::Text => println!("{}", render_leases(&table)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }

    Ok(())
}

fn run_forwards(args: ForwardsArgs) -> Result<()> {
    let mapping = decode_file(&args.file)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    let table = ForwardTable::from_mapping(&mapping, !args.no_check_count)
        .context("failed to read the port-forward table")?;

    match args.format {
        OutputFormat::Text => println!("{}", render_forwards(&table)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }

    Ok(())
}

fn resolve_known_keys(path: Option<&Path>) -> Vec<KnownKey> {
    let Some(path) = path else {
        return default_known_keys();
    };
    match load_known_keys(path) {
        Ok(keys) => keys,
        Err(err) => {
            eprintln!(
                "warning: failed to load key annotations from {} ({err}); using embedded defaults",
                path.display()
            );
            default_known_keys()
        }
    }
}

fn filter_entries(mapping: BackupMapping, keys: &[String], prefix: Option<&str>) -> BackupMapping {
    if keys.is_empty() && prefix.is_none() {
        return mapping;
    }

    mapping
        .iter()
        .filter(|(key, _)| {
            let key = String::from_utf8_lossy(key);
            keys.iter().any(|wanted| wanted.as_str() == key)
                || prefix.is_some_and(|prefix| key.starts_with(prefix))
        })
        .map(|(key, value)| (key.to_vec(), value.to_vec()))
        .collect()
}

#[derive(Debug, serde::Serialize)]
struct EntryRow {
    key: String,
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
}
