use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use nvram_backup_core::{encode, BackupMapping};
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
fn diff_marks_changed_and_one_sided_keys() {
    let dir = tempdir().expect("tempdir");
    let before = write_backup(
        dir.path(),
        "before.bkp",
        &[("lan_ipaddr", "192.168.1.1"), ("old_key", "x")],
    );
    let after = write_backup(
        dir.path(),
        "after.bkp",
        &[("lan_ipaddr", "10.0.0.1"), ("new_key", "y")],
    );

    cmd()
        .arg("diff")
        .arg(&before)
        .arg(&after)
        .assert()
        .success()
        .stdout(predicate::str::contains("~ lan_ipaddr"))
        .stdout(predicate::str::contains("- old_key"))
        .stdout(predicate::str::contains("+ new_key"))
        .stdout(predicate::str::contains(
            "identical=0 modified=1 only_left=1 only_right=1",
        ));
}

#[test]
fn diff_summary_prints_counts_only() {
    let dir = tempdir().expect("tempdir");
    let before = write_backup(dir.path(), "before.bkp", &[("a", "1")]);
    let after = write_backup(dir.path(), "after.bkp", &[("a", "2")]);

    cmd()
        .arg("diff")
        .arg(&before)
        .arg(&after)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("modified=1"))
        .stdout(predicate::str::contains("~ a").not());
}

#[test]
fn diff_verbose_includes_identical_entries() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(dir.path(), "same.bkp", &[("a", "1")]);

    cmd()
        .arg("diff")
        .arg(&backup)
        .arg(&backup)
        .arg("--verbose")
        .assert()
        .success()
        .stdout(predicate::str::contains("= a"));
}

#[test]
fn diff_emits_tagged_json() {
    let dir = tempdir().expect("tempdir");
    let before = write_backup(dir.path(), "before.bkp", &[("a", "1")]);
    let after = write_backup(dir.path(), "after.bkp", &[("a", "2")]);

    cmd()
        .arg("diff")
        .arg(&before)
        .arg(&after)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type": "Modified""#))
        .stdout(predicate::str::contains(r#""key": "a""#));
}
