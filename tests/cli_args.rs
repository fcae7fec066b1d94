//! Argument handling shared by all subcommands.

mod common;

use common::{cmd, write_pdf};
use predicates::prelude::*;

#[test]
fn help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("mcp"));
}

#[test]
fn malformed_tokens_exit_with_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "test.pdf", 12);

    for (flag, token, kind) in [
        ("-l", "1,x", "list"),
        ("-r", "1-2-3", "range"),
        ("-r", "5-2", "range"),
        ("-i", "0", "index"),
        ("-i", "[1]", "index"),
    ] {
        cmd(dir.path())
            .args(["delete", "test.pdf", flag, token])
            .assert()
            .code(2)
            .stderr(predicate::str::contains(format!(
                "'{token}' is not a valid {kind} selection"
            )));
    }
    assert!(!dir.path().join("test_deleted.pdf").exists());
}

#[test]
fn malformed_token_reported_before_reading_file() {
    let dir = tempfile::tempdir().unwrap();

    cmd(dir.path())
        .args(["extract", "missing.pdf", "-r", "a-b"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("'a-b' is not a valid range selection"));
}

#[test]
fn empty_selection() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "test.pdf", 3);

    cmd(dir.path())
        .args(["extract", "test.pdf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No pages selected."));
}

#[test]
fn output_checks() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "test.pdf", 3);
    std::fs::write(dir.path().join("test.txt"), "text").unwrap();

    cmd(dir.path())
        .args(["reverse", "test.pdf", "-o", "test.pdf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Cannot output to input file."));

    cmd(dir.path())
        .args(["reverse", "test.pdf", "-o", "out.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Only .pdf files allowed."));

    cmd(dir.path())
        .args(["reverse", "test.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Only .pdf files allowed."));
}

#[test]
fn unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    cmd(dir.path())
        .args(["info", "broken.pdf"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("File cannot be read"));
}

#[test]
fn output_goes_into_new_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(dir.path(), "test.pdf", 3);

    cmd(dir.path())
        .args(["extract", "test.pdf", "-i", "2", "-o", "nested/out.pdf", "-vv"])
        .assert()
        .success();
    assert!(dir.path().join("nested/out.pdf").exists());
}

#[test]
fn unknown_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["delete", "test.pdf", "--pages", "1"])
        .assert()
        .code(2);
}
