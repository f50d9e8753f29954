//! Integration tests for the SecurePass CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`. The
//! master password is supplied through `SECUREPASS_PASSWORD` and entry
//! passwords through piped stdin, so no prompt is ever shown.

use assert_cmd::Command;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "CorrectHorse1!";

/// Helper: get a Command pointing at the securepass binary.
fn securepass() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("securepass").expect("binary should exist")
}

/// Helper: a command bound to `dir` with the master password set.
fn securepass_in(dir: &TempDir) -> Command {
    let mut cmd = securepass();
    cmd.arg("--vault-dir")
        .arg(dir.path().join("vault"))
        .env("SECUREPASS_PASSWORD", PASSWORD)
        .env_remove("SECUREPASS_NEW_PASSWORD")
        .env_remove("SECUREPASS_DIR");
    cmd
}

fn init(dir: &TempDir) {
    securepass_in(dir).arg("init").assert().success();
}

// ---------------------------------------------------------------------------
// Help and usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    securepass()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted password vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("passwd"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("import"));
}

#[test]
fn version_flag_shows_version() {
    securepass()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("securepass"));
}

#[test]
fn no_args_shows_help() {
    securepass()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ---------------------------------------------------------------------------
// Account lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_files() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    let vault = tmp.path().join("vault");
    assert!(vault.join("config.toml").exists());
    assert!(vault.join("passwords.vault").exists());
}

#[test]
fn init_twice_fails() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already enrolled"));
}

#[test]
fn init_rejects_short_password() {
    let tmp = TempDir::new().unwrap();
    securepass_in(&tmp)
        .env("SECUREPASS_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn list_without_account_fails() {
    let tmp = TempDir::new().unwrap();
    securepass_in(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No account found"));
}

#[test]
fn wrong_password_is_rejected() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .env("SECUREPASS_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

#[test]
fn add_then_list_and_search() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["add", "example.com", "alice", "--url", "https://example.com"])
        .write_stdin("p@ss\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved credential for 'example.com'"));

    securepass_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("p@ss").not());

    securepass_in(&tmp)
        .args(["list", "--show-passwords"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p@ss"));

    securepass_in(&tmp)
        .args(["search", "ALICE"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 match(es)"));

    securepass_in(&tmp)
        .args(["search", "nobody"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 match(es)"));
}

#[test]
fn add_with_empty_stdin_fails() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["add", "example.com", "alice"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no password given"));
}

#[test]
fn export_and_import_roundtrip() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["add", "example.com", "alice"])
        .write_stdin("p@ss\n")
        .assert()
        .success();

    let exported = tmp.path().join("backup.vault");
    securepass_in(&tmp)
        .arg("export")
        .arg(&exported)
        .assert()
        .success();
    assert!(exported.exists());

    securepass_in(&tmp)
        .arg("import")
        .arg(&exported)
        .arg("--force")
        .assert()
        .success();

    securepass_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"));
}

#[test]
fn import_of_garbage_fails_and_keeps_records() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["add", "example.com", "alice"])
        .write_stdin("p@ss\n")
        .assert()
        .success();

    let garbage = tmp.path().join("garbage.vault");
    std::fs::write(&garbage, b"SPVT not really").unwrap();

    securepass_in(&tmp)
        .arg("import")
        .arg(&garbage)
        .arg("--force")
        .assert()
        .failure();

    securepass_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"));
}

// ---------------------------------------------------------------------------
// Passphrase change
// ---------------------------------------------------------------------------

#[test]
fn passwd_switches_master_password() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["add", "example.com", "alice"])
        .write_stdin("p@ss\n")
        .assert()
        .success();

    securepass_in(&tmp)
        .env("SECUREPASS_NEW_PASSWORD", "BatteryStaple2?")
        .arg("passwd")
        .assert()
        .success();

    securepass_in(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid master password"));

    securepass_in(&tmp)
        .env("SECUREPASS_PASSWORD", "BatteryStaple2?")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com"));
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_set_then_get() {
    let tmp = TempDir::new().unwrap();

    securepass_in(&tmp)
        .args(["config", "get", "security", "lock_timeout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("300"));

    securepass_in(&tmp)
        .args(["config", "set", "security", "lock_timeout", "600"])
        .assert()
        .success();

    securepass_in(&tmp)
        .args(["config", "get", "security", "lock_timeout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("600"));
}

#[test]
fn config_refuses_auth_section() {
    let tmp = TempDir::new().unwrap();

    securepass_in(&tmp)
        .args(["config", "set", "auth", "salt", "x"])
        .assert()
        .failure();
}

#[test]
fn config_reset_keeps_account() {
    let tmp = TempDir::new().unwrap();
    init(&tmp);

    securepass_in(&tmp)
        .args(["config", "set", "app", "theme", "light"])
        .assert()
        .success();

    securepass_in(&tmp)
        .args(["config", "reset", "--force"])
        .assert()
        .success();

    securepass_in(&tmp)
        .args(["config", "get", "app", "theme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark"));

    securepass_in(&tmp).arg("list").assert().success();
}

#[test]
fn parallel_adds_from_separate_processes_all_persist() {
    use std::io::Write;
    use std::process::Stdio;

    let tmp = TempDir::new().unwrap();
    init(&tmp);

    #[allow(deprecated)]
    let bin = assert_cmd::cargo::cargo_bin("securepass");
    let children: Vec<_> = (0..4)
        .map(|i| {
            let mut child = std::process::Command::new(&bin)
                .arg("--vault-dir")
                .arg(tmp.path().join("vault"))
                .args(["add", &format!("site{i}.example"), "alice"])
                .env("SECUREPASS_PASSWORD", PASSWORD)
                .env_remove("SECUREPASS_DIR")
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .expect("spawn securepass");
            child
                .stdin
                .take()
                .expect("stdin")
                .write_all(b"p@ss\n")
                .expect("write password");
            child
        })
        .collect();

    for mut child in children {
        assert!(child.wait().expect("wait").success());
    }

    securepass_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 credential(s)"));
}
