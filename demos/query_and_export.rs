//! Query and export walkthrough.
//!
//! Builds two tables, joins them, and writes the result to a timestamped
//! CSV file that can be imported again.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p csvman-demos --example query_and_export
//! ```

use csvman_core::{ImportMode, TabularResult, Value};
use csvman_interchange::{export_csv, normalize_path};
use csvman_sqlite::{Database, list_databases};

fn main() {
    let dir = std::env::temp_dir().join("csvman_query_and_export");
    std::fs::create_dir_all(&dir).unwrap();
    let db = Database::new(dir.join("shop.db"));

    let customers = TabularResult::new(vec!["id".into(), "name".into()]).with_rows(vec![
        vec![Value::Integer(1), Value::Text("ACME".into())],
        vec![Value::Integer(2), Value::Text("Globex".into())],
    ]);
    let orders = TabularResult::new(vec!["customer_id".into(), "amount".into()]).with_rows(vec![
        vec![Value::Integer(1), Value::Real(10.5)],
        vec![Value::Integer(1), Value::Real(4.0)],
        vec![Value::Integer(2), Value::Real(20.0)],
    ]);
    db.write_table("customers", &customers, ImportMode::Replace)
        .unwrap();
    db.write_table("orders", &orders, ImportMode::Replace).unwrap();
    println!("Databases: {:?}", list_databases(&dir).unwrap());

    let result = db
        .run_query(
            "SELECT c.name, SUM(o.amount) AS total FROM customers c \
             JOIN orders o ON o.customer_id = c.id GROUP BY c.name ORDER BY c.name",
        )
        .unwrap();
    for row in &result.rows {
        println!("  {} {}", row[0], row[1]);
    }

    let path = export_csv(&result, &dir).unwrap();
    println!("Exported to {}", path.display());

    let reimported = normalize_path(&path, None).unwrap();
    assert_eq!(reimported.rows, result.rows);
    println!("Re-import matches: {} rows", reimported.row_count());

    std::fs::remove_dir_all(&dir).unwrap();
}
