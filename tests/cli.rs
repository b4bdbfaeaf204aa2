#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;

fn cmd(dir: &std::path::Path) -> Command {
    let mut c = Command::cargo_bin("semainier-cli").unwrap();
    c.current_dir(dir);
    c
}

#[test]
fn init_creates_document() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path())
        .args(["init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    assert!(dir.path().join("planning.json").exists());
}

#[test]
fn generate_without_staff_warns_and_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).args(["init"]).assert().success();
    cmd(dir.path())
        .args([
            "generate",
            "--category",
            "openclose",
            "--week",
            "2026-08-24",
            "--seed",
            "1",
        ])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("no eligible candidate"));
}

#[test]
fn import_staff_then_generate_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("staff.csv");
    std::fs::write(
        &csv,
        "handle,display_name,roles,categories\n\
         apm,Alice,APM,openclose\n\
         bob,Bob,seller,openclose\n\
         cleo,Cleo,seller,openclose\n",
    )
    .unwrap();

    cmd(dir.path()).args(["init"]).assert().success();
    cmd(dir.path())
        .args(["import-staff", "--csv", csv.to_str().unwrap()])
        .assert()
        .success();
    cmd(dir.path())
        .args([
            "generate",
            "--category",
            "openclose",
            "--week",
            "2026-08-24",
            "--seed",
            "7",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("assigned"));
    cmd(dir.path())
        .args(["list", "--week", "2026-08-24"])
        .assert()
        .success()
        .stdout(predicate::str::contains("openclose"));
}

#[test]
fn validate_reports_missing_closers() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).args(["init"]).assert().success();
    // aucune affectation : chaque jour ouvert manque sa fermeture
    cmd(dir.path())
        .args(["validate", "--week", "2026-08-24"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no closer assigned"));
}

#[test]
fn unknown_week_listing_fails() {
    let dir = tempfile::tempdir().unwrap();
    cmd(dir.path()).args(["init"]).assert().success();
    cmd(dir.path())
        .args(["list", "--week", "2026-08-24"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no schedule stored"));
}
