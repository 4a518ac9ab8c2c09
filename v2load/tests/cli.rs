// The cargo_bin! macro requires build script setup that's overkill for simple tests.
#![allow(deprecated)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::path::Path;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn scenario(countries: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "common/countries.txt", countries);
    write(
        dir.path(),
        "common/static_modifiers.txt",
        "war = { war_exhaustion = 0.05 }\n",
    );
    write(dir.path(), "common/countries/Sweden.txt", "color = { 1 2 3 }\n");
    dir
}

#[test]
fn test_help_flag() {
    let mut cmd = Command::new(cargo_bin("v2load"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--game-path"))
        .stdout(predicate::str::contains("--strict"));
}

#[test]
fn test_game_path_respected() {
    // must fail on the given path rather than fall back to a detected install
    let mut cmd = Command::new(cargo_bin("v2load"));
    cmd.arg("--game-path")
        .arg("/nonexistent/path")
        .assert()
        .failure()
        .stderr(predicate::str::contains("nonexistent"));
}

#[test]
fn test_clean_scenario_succeeds() {
    let dir = scenario("SWE = Sweden\n");
    let mut cmd = Command::new(cargo_bin("v2load"));
    cmd.arg("--game-path")
        .arg(dir.path())
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 identities"))
        .stdout(predicate::str::contains("0 diagnostics"));
}

#[test]
fn test_diagnostics_are_printed_and_strict_fails() {
    let dir = scenario("SWE = Sweden\nSWED = Broken\nNORW = Broken\n");

    Command::new(cargo_bin("v2load"))
        .arg("--game-path")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "common/countries.txt line 2: encountered a tag that was not three characters",
        ));

    Command::new(cargo_bin("v2load"))
        .arg("--game-path")
        .arg(dir.path())
        .arg("--max-diagnostics")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("... and 1 more"));

    Command::new(cargo_bin("v2load"))
        .arg("--game-path")
        .arg(dir.path())
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("2 diagnostics"));
}

#[test]
fn test_config_file_enables_strict_mode() {
    let dir = scenario("SWEDEN = Sweden\n");
    let config = dir.path().join("load.json");
    std::fs::write(&config, r#"{ "fail_on_diagnostics": true }"#).unwrap();

    Command::new(cargo_bin("v2load"))
        .arg("--game-path")
        .arg(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();
}
