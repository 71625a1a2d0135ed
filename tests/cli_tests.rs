//! Tests for the `daolite` binary against a temporary database file.

use assert_cmd::Command;
use rusqlite::Connection;
use tempfile::TempDir;

fn seeded_database() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenario.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE test (id INTEGER PRIMARY KEY NOT NULL, name TEXT);
         INSERT INTO test (id, name) VALUES (1, 'Иван');",
    )
    .unwrap();
    (dir, path.to_str().unwrap().to_string())
}

fn run(args: &[&str]) -> serde_json::Value {
    let output = Command::cargo_bin("daolite")
        .unwrap()
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_cli_shapes() {
    let (_dir, db) = seeded_database();

    assert_eq!(
        run(&[db.as_str(), "all", "select * from test"]),
        serde_json::json!([{"id": 1, "name": "Иван"}])
    );
    assert_eq!(
        run(&[db.as_str(), "scalar", "select name from test where id = ?", "1"]),
        serde_json::json!("Иван")
    );
    assert_eq!(
        run(&[db.as_str(), "scalar", "select name from test where id = ?", "2"]),
        serde_json::Value::Null
    );
    assert_eq!(run(&[db.as_str(), "count", "select * from test"]), serde_json::json!(1));
}

#[test]
fn test_cli_column_selection() {
    let (_dir, db) = seeded_database();

    assert_eq!(
        run(&["--column", "name", db.as_str(), "column", "select * from test"]),
        serde_json::json!(["Иван"])
    );
    assert_eq!(
        run(&[db.as_str(), "column", "select * from test", "--column", "0"]),
        serde_json::json!([1])
    );

    Command::cargo_bin("daolite")
        .unwrap()
        .args([db.as_str(), "legacy", "select * from test where id = ?", "1"])
        .assert()
        .failure();
}

#[test]
fn test_cli_uses_config_file() {
    let (dir, db) = seeded_database();
    let config = dir.path().join("daolite.toml");
    std::fs::write(&config, "[connection]\nread_only = true\n").unwrap();
    let config = config.to_str().unwrap();

    Command::cargo_bin("daolite")
        .unwrap()
        .args(["--config", config, db.as_str(), "exec", "delete from test"])
        .assert()
        .failure();

    assert_eq!(
        run(&["--config", config, db.as_str(), "one", "select * from test"]),
        serde_json::json!({"id": 1, "name": "Иван"})
    );
}

#[test]
fn test_cli_reports_errors() {
    let (_dir, db) = seeded_database();

    Command::cargo_bin("daolite")
        .unwrap()
        .args([db.as_str(), "all", "select * from nonexistent_table"])
        .assert()
        .failure();

    Command::cargo_bin("daolite")
        .unwrap()
        .args([db.as_str(), "rows"])
        .assert()
        .failure();
}
