use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use nvram_backup_core::{decode_file, encode, BackupMapping};
use predicates::prelude::*;
use tempfile::tempdir;

fn write_backup(dir: &Path, name: &str, pairs: &[(&str, &str)]) -> PathBuf {
    let mapping: BackupMapping = pairs
        .iter()
        .map(|(k, v)| (k.as_bytes().to_vec(), v.as_bytes().to_vec()))
        .collect();
    let path = dir.join(name);
    fs::write(&path, encode(&mapping).expect("encode")).expect("write backup");
    path
}

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("ddwrt-nvram"))
}

#[test]
fn edit_writes_a_merged_backup() {
    let dir = tempdir().expect("tempdir");
    let input = write_backup(
        dir.path(),
        "in.bkp",
        &[("lan_ipaddr", "192.168.1.1"), ("old_key", "x")],
    );
    let output = dir.path().join("out.bkp");

    cmd()
        .arg("edit")
        .arg(&input)
        .arg("--set")
        .arg("lan_ipaddr=10.0.0.1")
        .arg("--set")
        .arg("router_name=lab")
        .arg("--unset")
        .arg("old_key")
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("sets=2 unsets=1"));

    let merged = decode_file(&output).expect("decode output");
    assert_eq!(merged.get("lan_ipaddr"), Some(b"10.0.0.1".as_slice()));
    assert_eq!(merged.get("router_name"), Some(b"lab".as_slice()));
    assert_eq!(merged.get("old_key"), None);

    // The input backup is untouched.
    let original = decode_file(&input).expect("decode input");
    assert_eq!(original.get("lan_ipaddr"), Some(b"192.168.1.1".as_slice()));
}

#[test]
fn edit_dry_run_prints_the_batch_without_writing() {
    let dir = tempdir().expect("tempdir");
    let input = write_backup(dir.path(), "in.bkp", &[("a", "1")]);

    cmd()
        .arg("edit")
        .arg(&input)
        .arg("--set")
        .arg("b=2")
        .arg("--unset")
        .arg("a")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("set b=2"))
        .stdout(predicate::str::contains("unset a"))
        .stdout(predicate::str::contains("pending sets=1 unsets=1"));

    assert!(!dir.path().join("out.bkp").exists());
}

#[test]
fn edit_requires_an_output_or_dry_run() {
    let dir = tempdir().expect("tempdir");
    let input = write_backup(dir.path(), "in.bkp", &[("a", "1")]);

    cmd()
        .arg("edit")
        .arg(&input)
        .arg("--set")
        .arg("b=2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output or --dry-run"));
}

#[test]
fn edit_rejects_malformed_set_specs() {
    let dir = tempdir().expect("tempdir");
    let input = write_backup(dir.path(), "in.bkp", &[("a", "1")]);

    cmd()
        .arg("edit")
        .arg(&input)
        .arg("--set")
        .arg("no-equals-here")
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));

    // An empty key is rejected even though the argument contains '='.
    cmd()
        .arg("edit")
        .arg(&input)
        .arg("--set")
        .arg("=value")
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot set"));
}
