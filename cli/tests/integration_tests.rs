use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Helper to create a temp directory that is cleaned up on drop.
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("csvman_cli_test_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).expect("failed to create temp dir");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

/// Runs the binary inside `dir` so no stray `csvman.yml` is picked up.
fn csvman(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_csvman"))
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run csvman")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Writes `orders.csv` and imports it into `sales.db`.
fn import_orders(dir: &TempDir) {
    fs::write(
        dir.join("orders.csv"),
        "id,amount,note\n1,10.50,first\n2,20.00,\n",
    )
    .expect("failed to write csv");
    let out = csvman(
        dir,
        &["import", "--db", "sales", "--table", "orders", "--file", "orders.csv"],
    );
    assert!(out.status.success(), "import failed: {}", stderr(&out));
}

fn query_json(dir: &TempDir, sql: &str) -> serde_json::Value {
    let out = csvman(dir, &["query", "--db", "sales", "--sql", sql, "--format", "json"]);
    assert!(out.status.success(), "query failed: {}", stderr(&out));
    serde_json::from_str(&stdout(&out)).expect("query output is not JSON")
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

#[test]
fn import_creates_database_and_table() {
    let dir = TempDir::new("import_creates");
    import_orders(&dir);

    assert!(dir.join("sales.db").is_file());
    let tables = csvman(&dir, &["tables", "--db", "sales"]);
    assert_eq!(stdout(&tables), "orders\n");

    let json = query_json(&dir, "SELECT id, amount, note FROM orders ORDER BY id");
    assert_eq!(json["columns"], serde_json::json!(["id", "amount", "note"]));
    assert_eq!(
        json["rows"],
        serde_json::json!([[1, 10.5, "first"], [2, 20.0, null]])
    );
}

#[test]
fn import_prints_preview_and_summary() {
    let dir = TempDir::new("import_preview");
    fs::write(dir.join("items.csv"), "sku,label\n7,bolt\n").unwrap();
    let out = csvman(
        &dir,
        &["import", "--db", "shop", "--table", "items", "--file", "items.csv"],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    let text = stdout(&out);
    assert!(text.contains("sku  label"), "{text}");
    assert!(text.contains("7    bolt"), "{text}");
    assert!(text.contains("Imported 1 rows into 'items' (replace)"), "{text}");
}

#[test]
fn import_append_with_other_columns_fails_and_keeps_data() {
    let dir = TempDir::new("import_mismatch");
    import_orders(&dir);
    fs::write(dir.join("other.csv"), "id,colour\n3,red\n").unwrap();

    let out = csvman(
        &dir,
        &[
            "import", "--db", "sales", "--table", "orders", "--file", "other.csv", "--mode",
            "append",
        ],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("schema mismatch"), "{}", stderr(&out));

    let json = query_json(&dir, "SELECT COUNT(*) AS n FROM orders");
    assert_eq!(json["rows"], serde_json::json!([[2]]));
}

#[test]
fn import_into_existing_table_appends_by_default() {
    let dir = TempDir::new("import_append_default");
    import_orders(&dir);
    let out = csvman(
        &dir,
        &["import", "--db", "sales", "--table", "orders", "--file", "orders.csv"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("(append)"));

    let json = query_json(&dir, "SELECT COUNT(*) AS n FROM orders");
    assert_eq!(json["rows"], serde_json::json!([[4]]));
}

#[test]
fn import_unsupported_file_fails() {
    let dir = TempDir::new("import_unsupported");
    fs::write(dir.join("notes.pdf"), "not a table").unwrap();
    let out = csvman(
        &dir,
        &["import", "--db", "sales", "--table", "notes", "--file", "notes.pdf"],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Unsupported format"), "{}", stderr(&out));
    assert!(!dir.join("sales.db").exists());
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

#[test]
fn query_unknown_table_reports_engine_message() {
    let dir = TempDir::new("query_unknown");
    import_orders(&dir);
    let out = csvman(
        &dir,
        &["query", "--db", "sales", "--sql", "SELECT * FROM nonexistent"],
    );
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.starts_with("error: "), "{err}");
    assert!(err.contains("no such table: nonexistent"), "{err}");
}

#[test]
fn query_table_output_respects_limit() {
    let dir = TempDir::new("query_limit");
    import_orders(&dir);
    let out = csvman(
        &dir,
        &[
            "query", "--db", "sales", "--sql", "SELECT id FROM orders ORDER BY id", "--limit",
            "1",
        ],
    );
    assert!(out.status.success());
    assert_eq!(stdout(&out), "id\n--\n1\n(1 of 2 rows shown)\n");
}

#[test]
fn query_dml_reports_affected_rows() {
    let dir = TempDir::new("query_dml");
    import_orders(&dir);
    let out = csvman(
        &dir,
        &["query", "--db", "sales", "--sql", "DELETE FROM orders WHERE id = 2"],
    );
    assert!(out.status.success());
    assert!(stdout(&out).contains("1 row(s) affected"));
}

#[test]
fn query_export_writes_csv_to_configured_directory() {
    let dir = TempDir::new("query_export");
    import_orders(&dir);
    fs::write(dir.join("custom.yml"), "export_dir: exports\n").unwrap();

    let out = csvman(
        &dir,
        &[
            "--config",
            "custom.yml",
            "query",
            "--db",
            "sales",
            "--sql",
            "SELECT id, note FROM orders ORDER BY id",
            "--export",
        ],
    );
    assert!(out.status.success(), "{}", stderr(&out));

    let exports: Vec<PathBuf> = fs::read_dir(dir.join("exports"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(exports.len(), 1);
    let name = exports[0].file_name().unwrap().to_str().unwrap().to_string();
    assert!(name.starts_with("query_result_") && name.ends_with(".csv"), "{name}");
    assert_eq!(
        fs::read_to_string(&exports[0]).unwrap(),
        "id,note\n1,first\n2,\n"
    );
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = TempDir::new("missing_config");
    let out = csvman(&dir, &["--config", "absent.yml", "databases"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Failed to load configuration"));
}

// ---------------------------------------------------------------------------
// Schema changes
// ---------------------------------------------------------------------------

#[test]
fn alter_column_changes_type_and_values() {
    let dir = TempDir::new("alter_column");
    fs::write(dir.join("orders.csv"), "id,amount\n1,A1\n2,B2\n").unwrap();
    let out = csvman(
        &dir,
        &["import", "--db", "sales", "--table", "orders", "--file", "orders.csv"],
    );
    assert!(out.status.success());
    let out = csvman(
        &dir,
        &[
            "query",
            "--db",
            "sales",
            "--sql",
            "UPDATE orders SET amount = CASE id WHEN 1 THEN '10.50' ELSE '20.00' END",
        ],
    );
    assert!(out.status.success());

    let out = csvman(
        &dir,
        &[
            "alter-column", "--db", "sales", "--table", "orders", "--column", "amount", "--type",
            "FLOAT(30,4)",
        ],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("from TEXT to FLOAT(30,4) (2 rows copied)"));

    let json = query_json(&dir, "SELECT amount FROM orders ORDER BY id");
    assert_eq!(json["rows"], serde_json::json!([[10.5], [20.0]]));

    let describe = csvman(&dir, &["describe", "--db", "sales", "--table", "orders"]);
    assert!(stdout(&describe).contains("amount  FLOAT(30,4)"));
}

#[test]
fn alter_column_cast_error_leaves_table() {
    let dir = TempDir::new("alter_cast_error");
    import_orders(&dir);
    let out = csvman(
        &dir,
        &[
            "alter-column", "--db", "sales", "--table", "orders", "--column", "note", "--type",
            "INTEGER",
        ],
    );
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("cannot cast value 'first'"), "{}", stderr(&out));

    let json = query_json(&dir, "SELECT note FROM orders ORDER BY id");
    assert_eq!(json["rows"], serde_json::json!([["first"], [null]]));
}

#[test]
fn drop_table_requires_confirmation() {
    let dir = TempDir::new("drop_table");
    import_orders(&dir);

    let out = csvman(&dir, &["drop-table", "--db", "sales", "--table", "orders"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("pass --yes"));
    assert_eq!(stdout(&csvman(&dir, &["tables", "--db", "sales"])), "orders\n");

    let out = csvman(
        &dir,
        &["drop-table", "--db", "sales", "--table", "orders", "--yes"],
    );
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(
        stdout(&csvman(&dir, &["tables", "--db", "sales"])).starts_with("No tables"),
    );
}

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

#[test]
fn databases_lists_db_files() {
    let dir = TempDir::new("databases");
    import_orders(&dir);
    fs::write(dir.join("readme.txt"), "x").unwrap();

    let out = csvman(&dir, &["databases"]);
    assert_eq!(stdout(&out), "sales.db\n");

    let other = TempDir::new("databases_empty");
    let out = csvman(
        &dir,
        &["databases", "--dir", other.path().to_str().unwrap()],
    );
    assert!(stdout(&out).starts_with("No databases"));
}

#[test]
fn describe_missing_database_fails_without_creating_it() {
    let dir = TempDir::new("describe_missing");
    let out = csvman(&dir, &["describe", "--db", "ghost", "--table", "t"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("database not found"));
    assert!(!dir.join("ghost.db").exists());
}

#[test]
fn info_shows_every_table() {
    let dir = TempDir::new("info");
    import_orders(&dir);
    fs::write(dir.join("items.csv"), "sku\n1\n").unwrap();
    let out = csvman(
        &dir,
        &["import", "--db", "sales", "--table", "items", "--file", "items.csv"],
    );
    assert!(out.status.success());

    let out = csvman(&dir, &["info", "--db", "sales", "--format", "json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json[0]["name"], "orders");
    assert_eq!(json[0]["row_count"], 2);
    assert_eq!(json[1]["name"], "items");
    assert_eq!(json[1]["sample"]["rows"], serde_json::json!([[1]]));
}

#[test]
fn info_on_missing_database_reports_no_tables() {
    let dir = TempDir::new("info_missing");
    let out = csvman(&dir, &["info", "--db", "ghost"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("No tables in"));
    assert!(!dir.join("ghost.db").exists());
}
