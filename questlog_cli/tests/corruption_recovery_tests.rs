//! Corruption recovery tests for questlog.
//!
//! These tests verify the system can handle:
//! - Corrupted snapshot entries
//! - A snapshot with one entry missing
//! - Unparseable import documents

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("questlog"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_corrupted_skills_entry_falls_back_to_starter_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::write(data_dir.join("skills.json"), "{ invalid json }}}}")
        .expect("Failed to write corrupted entry");
    fs::write(data_dir.join("habits.json"), "[]").expect("Failed to write habits entry");

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Strength (STR)"))
        .stderr(predicate::str::contains("Failed to parse snapshot entry"));
}

#[test]
fn test_next_mutation_repairs_corrupted_snapshot() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    fs::write(data_dir.join("skills.json"), "not json").unwrap();
    fs::write(data_dir.join("habits.json"), "also not json").unwrap();

    cli()
        .args(["complete", "1", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    let skills: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data_dir.join("skills.json")).unwrap())
            .expect("skills entry should be valid JSON after save");
    assert_eq!(skills[0]["exp"], 50);

    let habits: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data_dir.join("habits.json")).unwrap())
            .expect("habits entry should be valid JSON after save");
    assert_eq!(habits.as_array().unwrap().len(), 4);
}

#[test]
fn test_missing_habits_entry_uses_starter_state() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    // Valid skills entry on its own is not a complete snapshot
    fs::write(
        data_dir.join("skills.json"),
        r#"[{"id":"x","name":"Lonely","abbr":"LON","exp":5}]"#,
    )
    .unwrap();

    cli()
        .arg("status")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Lonely").not())
        .stdout(predicate::str::contains("Alchemy (ALC)"));
}

#[test]
fn test_unparseable_import_is_rejected() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["skill", "add", "--name", "Archery", "--abbr", "ARC", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success();

    let doc_path = data_dir.join("broken.json");
    fs::write(&doc_path, "{\"skills\": [ {\"id\": ").unwrap();

    cli()
        .arg("import")
        .arg(&doc_path)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Format"));

    cli()
        .args(["skill", "list", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archery (ARC)"));
}

#[test]
fn test_missing_import_file_is_io_error() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("import")
        .arg(temp_dir.path().join("nope.json"))
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Io"));
}

#[test]
fn test_sequential_runs_accumulate_exp() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    for _ in 0..7 {
        cli()
            .args(["complete", "3", "--data-dir"])
            .arg(&data_dir)
            .assert()
            .success();
    }

    let skills: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data_dir.join("skills.json")).unwrap()).unwrap();
    // Practice meditation: 20 Stealth, 20 Intellect per completion
    assert_eq!(skills[1]["exp"], 140);
    assert_eq!(skills[2]["exp"], 140);

    let extras: Vec<_> = fs::read_dir(&data_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let name = e.file_name();
            name != "skills.json" && name != "habits.json"
        })
        .collect();
    assert!(extras.is_empty(), "Unexpected files: {:?}", extras);
}
