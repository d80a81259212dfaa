use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn luma_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn compiles_a_file_and_prints_bytecode() {
    let file = luma_file("1 + 2");

    Command::cargo_bin("lumac")
        .unwrap()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ADD_INT"));
}

#[test]
fn reports_parser_errors_and_exits_non_zero() {
    let file = luma_file("let");

    Command::cargo_bin("lumac")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Parser has errors"));
}

#[test]
fn reports_type_errors_and_exits_non_zero() {
    let file = luma_file("let x int = \"hi\"");

    Command::cargo_bin("lumac")
        .unwrap()
        .arg(file.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Type checker has errors"));
}

#[test]
fn missing_file_is_reported_as_an_io_error() {
    Command::cargo_bin("lumac")
        .unwrap()
        .arg("/nonexistent/path/does-not-exist.luma")
        .assert()
        .failure();
}

#[test]
fn rejects_an_unreadable_config_file() {
    Command::cargo_bin("lumac")
        .unwrap()
        .args(["--config", "/nonexistent/lumac.toml"])
        .assert()
        .failure();
}
