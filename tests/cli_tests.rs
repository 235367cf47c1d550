//! Binary-level tests: argument handling, exit codes, output

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn dirsync() -> Command {
    Command::cargo_bin("dirsync").expect("binary built")
}

/// Temp dir with `left/` and `right/` roots
fn two_roots() -> TempDir {
    let temp = TempDir::new().expect("create tempdir");
    fs::create_dir(temp.path().join("left")).unwrap();
    fs::create_dir(temp.path().join("right")).unwrap();
    temp
}

#[test]
fn test_version_flag() {
    dirsync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_sync_needs_two_roots() {
    let temp = two_roots();
    dirsync()
        .current_dir(temp.path())
        .args(["sync", "left"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("At least two root directories"));
}

#[test]
fn test_sync_lists_every_missing_root() {
    let temp = two_roots();
    dirsync()
        .current_dir(temp.path())
        .args(["sync", "left", "nope", "gone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"nope\" does not exist"))
        .stderr(predicate::str::contains("\"gone\" does not exist"));
}

#[test]
fn test_sync_yes_copies_everything() {
    let temp = two_roots();
    fs::write(temp.path().join("left/a.txt"), b"a").unwrap();
    fs::create_dir(temp.path().join("right/empty")).unwrap();

    dirsync()
        .current_dir(temp.path())
        .args(["s", "left", "right", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file copied"))
        .stdout(predicate::str::contains("1 folder created"));

    assert!(temp.path().join("right/a.txt").is_file());
    assert!(temp.path().join("left/empty").is_dir());
    assert!(temp.path().join("left/dirsync.config.json").is_file());
    assert!(!temp.path().join("dirsync-errors.json").exists());
}

#[test]
fn test_sync_without_terminal_answers_no() {
    let temp = two_roots();
    fs::write(temp.path().join("left/a.txt"), b"a").unwrap();

    dirsync()
        .current_dir(temp.path())
        .args(["sync", "left", "right"])
        .write_stdin("")
        .assert()
        .success();

    assert!(!temp.path().join("right/a.txt").exists());
}

#[test]
fn test_sync_force_is_not_supported() {
    let temp = two_roots();
    dirsync()
        .current_dir(temp.path())
        .args(["sync", "left", "right", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not supported"));

    assert!(!temp.path().join("left/dirsync.config.json").exists());
}

#[test]
fn test_analyse_prints_differences() {
    let temp = two_roots();
    fs::write(temp.path().join("left/only-left.txt"), b"l").unwrap();
    fs::create_dir(temp.path().join("right/only-right")).unwrap();

    dirsync()
        .current_dir(temp.path())
        .args(["analyse", "left", "right"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Files missing from"))
        .stdout(predicate::str::contains("only-left.txt"))
        .stdout(predicate::str::contains("only-right/"));

    // read-only
    assert!(!temp.path().join("left/dirsync.config.json").exists());
}

#[test]
fn test_analyse_writes_json_report() {
    let temp = two_roots();
    fs::write(temp.path().join("right/r.txt"), b"r").unwrap();

    dirsync()
        .current_dir(temp.path())
        .args(["a", "left", "right", "--output", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(temp.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(report["levels"][0]["entries"][0]["name"], "r.txt");
    assert_eq!(report["levels"][0]["entries"][0]["missingFrom"][0], 0);
}

#[test]
fn test_analyse_rejects_bad_depth() {
    let temp = two_roots();
    dirsync()
        .current_dir(temp.path())
        .args(["analyse", "left", "right", "--depth", "-4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Depth -4"));
}
