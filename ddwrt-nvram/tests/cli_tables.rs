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
fn leases_renders_the_table() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(
        dir.path(),
        "nvram.bkp",
        &[
            ("static_leases", "AA:BB:CC:DD:EE:FF=nas=192.168.1.10= "),
            ("static_leasenum", "1"),
        ],
    );

    cmd()
        .arg("leases")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("static_leases count=1"))
        .stdout(predicate::str::contains(
            "- nas: ip=192.168.1.10 mac=AA:BB:CC:DD:EE:FF",
        ));
}

#[test]
fn leases_count_drift_fails_unless_disabled() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(
        dir.path(),
        "nvram.bkp",
        &[
            ("static_leases", "AA:BB:CC:DD:EE:FF=nas=192.168.1.10= "),
            ("static_leasenum", "4"),
        ],
    );

    cmd()
        .arg("leases")
        .arg(&backup)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to read the static lease table",
        ));

    cmd()
        .arg("leases")
        .arg(&backup)
        .arg("--no-check-count")
        .assert()
        .success()
        .stdout(predicate::str::contains("static_leases count=1"));
}

#[test]
fn forwards_renders_rules_with_restrictions() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(
        dir.path(),
        "nvram.bkp",
        &[
            (
                "forward_spec",
                "web:on:tcp:80>192.168.1.10:8080<192.168.1.0/24 ssh:off:udp:22>10.0.0.2:22 ",
            ),
            ("forwardspec_entries", "2"),
        ],
    );

    cmd()
        .arg("forwards")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("forward_spec count=2"))
        .stdout(predicate::str::contains(
            "- web: on tcp 80>192.168.1.10:8080 source=192.168.1.0/24",
        ))
        .stdout(predicate::str::contains("- ssh: off udp 22>10.0.0.2:22"));
}

#[test]
fn forwards_emits_json_with_typed_fields() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(
        dir.path(),
        "nvram.bkp",
        &[
            ("forward_spec", "web:on:tcp:80>192.168.1.10:8080"),
            ("forwardspec_entries", "1"),
        ],
    );

    cmd()
        .arg("forwards")
        .arg(&backup)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "web""#))
        .stdout(predicate::str::contains(r#""state": "on""#))
        .stdout(predicate::str::contains(r#""from_port": 80"#));
}

#[test]
fn tables_require_their_keys() {
    let dir = tempdir().expect("tempdir");
    let backup = write_backup(dir.path(), "nvram.bkp", &[("lan_ipaddr", "192.168.1.1")]);

    cmd()
        .arg("forwards")
        .arg(&backup)
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to read the port-forward table",
        ));
}
