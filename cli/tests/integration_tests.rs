use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use docstore_sqlite::{DalConfig, Database, QueryOptions};

fn docstore(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_docstore"))
        .arg("--db")
        .arg(db)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .output()
        .expect("failed to run docstore")
}

fn docstore_with_stdin(db: &Path, args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_docstore"))
        .arg("--db")
        .arg(db)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn docstore");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for docstore")
}

fn create_files_table(db: &Path) {
    let output = docstore(
        db,
        &[
            "create",
            "files",
            "--column",
            "id:INTEGER PRIMARY KEY",
            "--column",
            "name:TEXT",
            "--column",
            "size:INTEGER",
        ],
    );
    assert!(
        output.status.success(),
        "create failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

// ---------------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------------

#[test]
fn create_insert_get_prints_rows_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let insert = docstore(
        &db,
        &["insert", "files", "--json", r#"{"id": 1, "name": "a.txt", "size": 10}"#],
    );
    assert!(insert.status.success());

    let get = docstore(&db, &["get", "files", "--where", "id = 1"]);
    assert!(get.status.success());
    assert_eq!(
        stdout_json(&get),
        serde_json::json!([{"id": 1, "name": "a.txt", "size": 10}])
    );
}

#[test]
fn array_insert_goes_through_one_transaction() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let insert = docstore(
        &db,
        &[
            "insert",
            "files",
            "--json",
            r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}, {"id": 3, "name": "c"}]"#,
        ],
    );
    assert!(insert.status.success());
    assert!(String::from_utf8_lossy(&insert.stdout).contains("Inserted 3 row(s)"));

    let get = docstore(&db, &["get", "files", "--order-by", "id DESC", "--limit", "2"]);
    let rows = stdout_json(&get);
    assert_eq!(rows.as_array().unwrap().len(), 2);
    assert_eq!(rows[0]["name"], "c");
}

#[test]
fn tables_and_schema_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let tables = docstore(&db, &["tables"]);
    assert_eq!(stdout_json(&tables), serde_json::json!(["files"]));

    let schema = docstore(&db, &["schema", "files"]);
    assert_eq!(
        stdout_json(&schema),
        serde_json::json!([
            {"name": "id", "type": "INTEGER"},
            {"name": "name", "type": "TEXT"},
            {"name": "size", "type": "INTEGER"}
        ])
    );
}

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

#[test]
fn delete_without_where_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let output = docstore(&db, &["delete", "files"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("where clause is required"));
}

#[test]
fn forced_delete_removes_matching_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);
    docstore(
        &db,
        &["insert", "files", "--json", r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#],
    );

    let output = docstore(&db, &["--force", "delete", "files", "--where", "id = 1"]);
    assert!(output.status.success());

    let get = docstore(&db, &["get", "files"]);
    assert_eq!(stdout_json(&get), serde_json::json!([{"id": 2, "name": "b", "size": null}]));
}

#[test]
fn declined_drop_keeps_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let output = docstore_with_stdin(&db, &["drop", "files"], "n\n");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("(y/n)"));

    let tables = docstore(&db, &["tables"]);
    assert_eq!(stdout_json(&tables), serde_json::json!(["files"]));
}

#[test]
fn confirmed_drop_removes_table() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let output = docstore_with_stdin(&db, &["drop", "files"], "yes\n");
    assert!(output.status.success());

    let tables = docstore(&db, &["tables"]);
    assert_eq!(stdout_json(&tables), serde_json::json!([]));
}

#[test]
fn dry_run_insert_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);

    let output = docstore(
        &db,
        &["--dry-run", "insert", "files", "--json", r#"{"id": 1, "name": "a"}"#],
    );
    assert!(output.status.success());
    // Previews show up without -v.
    assert!(String::from_utf8_lossy(&output.stderr).contains("INSERT INTO files (id, name)"));

    let get = docstore(&db, &["get", "files"]);
    assert_eq!(stdout_json(&get), serde_json::json!([]));
}

#[test]
fn update_with_blank_where_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    create_files_table(&db);
    docstore(&db, &["insert", "files", "--json", r#"{"id": 1, "name": "a"}"#]);

    let output = docstore(
        &db,
        &["update", "files", "--json", r#"{"name": "b"}"#, "--where", ""],
    );
    assert_eq!(output.status.code(), Some(1));

    let get = docstore(&db, &["get", "files"]);
    assert_eq!(stdout_json(&get)[0]["name"], "a");
}

#[test]
fn invalid_table_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");

    let output = docstore(&db, &["get", "files; DROP TABLE x"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid identifier"));
}

// ---------------------------------------------------------------------------
// Backup and config
// ---------------------------------------------------------------------------

#[test]
fn backup_copies_tables_and_rows() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    let target = dir.path().join("copy.db");
    create_files_table(&db);
    docstore(
        &db,
        &["insert", "files", "--json", r#"[{"id": 1, "name": "a"}, {"id": 2, "name": "b"}]"#],
    );

    let output = docstore(&db, &["backup", target.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "backup failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let copy = Database::open(&target).unwrap();
    let opts = QueryOptions::new();
    assert_eq!(copy.list_tables(&opts).unwrap(), vec!["files".to_string()]);
    assert_eq!(copy.row_count("files").unwrap(), 2);
    copy.close().unwrap();
}

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("docstore.yaml");

    let output = Command::new(env!("CARGO_BIN_EXE_docstore"))
        .args(["init-config", path.to_str().unwrap()])
        .output()
        .expect("failed to run docstore");
    assert!(output.status.success());

    assert_eq!(DalConfig::load(&path).unwrap(), DalConfig::default());
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data.db");
    let config = dir.path().join("absent.yaml");

    let output = docstore(&db, &["--config", config.to_str().unwrap(), "tables"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error: "));
}
