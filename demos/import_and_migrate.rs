//! Import and column migration walkthrough.
//!
//! Imports an orders CSV whose amounts arrive as text, inspects the table,
//! converts the amount column to a real type and shows what a failed
//! conversion looks like.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p csvman-demos --example import_and_migrate
//! ```

use csvman_core::ImportMode;
use csvman_interchange::{ImportFormat, normalize};
use csvman_sqlite::{Database, StorageError};

const ORDERS_CSV: &str = "\
id,amount,customer
1,$10.50,ACME
2,$20.00,Globex
3,$7.25,Initech
";

fn main() {
    // === Step 1: Scratch database ===
    let dir = std::env::temp_dir().join("csvman_import_and_migrate");
    std::fs::create_dir_all(&dir).unwrap();
    let db = Database::new(dir.join("sales.db"));

    // === Step 2: Normalize and import ===
    println!("=== Import ===");
    let batch = normalize(ORDERS_CSV.as_bytes(), ImportFormat::Csv).unwrap();
    println!("Columns: {:?}", batch.columns);
    println!("Kinds:   {:?}", batch.column_kinds());
    let report = db.write_table("orders", &batch, ImportMode::Replace).unwrap();
    println!("Wrote {} rows into '{}'", report.rows_written, report.table);

    // === Step 3: Inspect ===
    let info = db.describe_table("orders").unwrap();
    for column in &info.columns {
        println!("  {} {}", column.name, column.declared_type);
    }

    // === Step 4: A conversion that would destroy data is refused ===
    println!("\n=== Failed migration ===");
    match db.change_column_type("orders", "amount", "FLOAT(30,4)") {
        Err(StorageError::CastError { value, .. }) => {
            println!("Refused: '{value}' is not a number; table unchanged")
        }
        other => println!("Unexpected outcome: {other:?}"),
    }

    // === Step 5: Clean the values, then migrate ===
    println!("\n=== Migration ===");
    db.run_query("UPDATE orders SET amount = REPLACE(amount, '$', '')")
        .unwrap();
    let report = db
        .change_column_type("orders", "amount", "FLOAT(30,4)")
        .unwrap();
    println!(
        "{}.{}: {} -> {} ({} rows)",
        report.table, report.column, report.previous_type, report.new_type, report.rows_copied
    );

    let total = db
        .run_query("SELECT SUM(amount) AS total FROM orders")
        .unwrap();
    println!("Total amount: {}", total.rows[0][0]);

    // === Step 6: Cleanup ===
    std::fs::remove_dir_all(&dir).unwrap();
}
