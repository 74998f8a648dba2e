mod output;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use csvman_core::{ImportMode, ManagerConfig};
use csvman_interchange::{export_csv, normalize_path};
use csvman_sqlite::{Database, database_path, list_databases};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, TableSummary, format_result, format_summaries};

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
    Yaml,
    Markdown,
    Csv,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Table => Self::Table,
            CliOutputFormat::Json => Self::Json,
            CliOutputFormat::Yaml => Self::Yaml,
            CliOutputFormat::Markdown => Self::Markdown,
            CliOutputFormat::Csv => Self::Csv,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliImportMode {
    Append,
    Replace,
}

impl From<CliImportMode> for ImportMode {
    fn from(mode: CliImportMode) -> Self {
        match mode {
            CliImportMode::Append => Self::Append,
            CliImportMode::Replace => Self::Replace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "csvman")]
#[command(about = "Import CSV and spreadsheet files into SQLite, query and reshape them")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./csvman.yml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List database files in the data directory.
    Databases(DatabasesArgs),
    /// List the tables of a database.
    Tables(TablesArgs),
    /// Show one table's columns, row count and first rows.
    Describe(DescribeArgs),
    /// Show every table of a database.
    Info(InfoArgs),
    /// Import a CSV or spreadsheet file into a table.
    Import(ImportArgs),
    /// Run one SQL statement.
    Query(QueryArgs),
    /// Change the declared type of a column, converting its values.
    AlterColumn(AlterColumnArgs),
    /// Permanently drop a table.
    DropTable(DropTableArgs),
}

#[derive(Debug, Args)]
struct DatabasesArgs {
    /// Directory to scan (default: configured data directory).
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TablesArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
    /// Table name.
    #[arg(long)]
    table: String,
    /// Number of sample rows (default: configured sample_rows).
    #[arg(long)]
    sample: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct InfoArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
    /// Number of sample rows per table (default: configured sample_rows).
    #[arg(long)]
    sample: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ImportArgs {
    /// Database name or path; created if missing.
    #[arg(long)]
    db: String,
    /// Target table name.
    #[arg(long)]
    table: String,
    /// CSV or spreadsheet file to import.
    #[arg(long)]
    file: PathBuf,
    /// Declared mime type; the file extension is used when omitted.
    #[arg(long)]
    mime: Option<String>,
    /// How to treat an existing table (new tables are always created).
    #[arg(long)]
    mode: Option<CliImportMode>,
}

#[derive(Debug, Args)]
struct QueryArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
    /// SQL statement, executed as given.
    #[arg(long)]
    sql: String,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
    /// Maximum rows to display (capped at 500).
    #[arg(long)]
    limit: Option<usize>,
    /// Also write the full result to a timestamped CSV file.
    #[arg(long)]
    export: bool,
}

#[derive(Debug, Args)]
struct AlterColumnArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
    /// Table name.
    #[arg(long)]
    table: String,
    /// Column name.
    #[arg(long)]
    column: String,
    /// New declared SQL type, e.g. INTEGER, TEXT or FLOAT(30,4).
    #[arg(long = "type")]
    new_type: String,
}

#[derive(Debug, Args)]
struct DropTableArgs {
    /// Database name or path.
    #[arg(long)]
    db: String,
    /// Table name.
    #[arg(long)]
    table: String,
    /// Confirm the drop. Without it nothing is changed.
    #[arg(long)]
    yes: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = load_config(cli.config.as_deref()).and_then(|config| run(&config, cli.command));

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: &ManagerConfig, command: Command) -> Result<(), String> {
    match command {
        Command::Databases(args) => run_databases(config, args),
        Command::Tables(args) => run_tables(config, args),
        Command::Describe(args) => run_describe(config, args),
        Command::Info(args) => run_info(config, args),
        Command::Import(args) => run_import(config, args),
        Command::Query(args) => run_query(config, args),
        Command::AlterColumn(args) => run_alter_column(config, args),
        Command::DropTable(args) => run_drop_table(config, args),
    }
}

fn load_config(path: Option<&Path>) -> Result<ManagerConfig, String> {
    let config = ManagerConfig::load_or_default(path)
        .map_err(|e| format!("Failed to load configuration: {e}"))?;
    debug!(?config, "Loaded configuration");
    Ok(config)
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

fn run_databases(config: &ManagerConfig, args: DatabasesArgs) -> Result<(), String> {
    let dir = args.dir.as_deref().unwrap_or(config.data_dir.as_path());
    let names = list_databases(dir)
        .map_err(|e| format!("Failed to list databases in '{}': {e}", dir.display()))?;
    if names.is_empty() {
        println!("No databases in '{}'.", dir.display());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

fn run_tables(config: &ManagerConfig, args: TablesArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let tables = db.list_tables().map_err(|e| e.to_string())?;
    if tables.is_empty() {
        println!("No tables in '{}'.", db.path().display());
    }
    for table in tables {
        println!("{table}");
    }
    Ok(())
}

fn run_describe(config: &ManagerConfig, args: DescribeArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let info = db.describe_table(&args.table).map_err(|e| e.to_string())?;
    let sample = db
        .sample_rows(&info.name, args.sample.unwrap_or(config.sample_rows))
        .map_err(|e| e.to_string())?;
    print!(
        "{}",
        format_summaries(&[TableSummary { info, sample }], args.format.into())?
    );
    Ok(())
}

fn run_info(config: &ManagerConfig, args: InfoArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let limit = args.sample.unwrap_or(config.sample_rows);
    let summaries = db
        .describe_all()
        .map_err(|e| e.to_string())?
        .into_iter()
        .map(|info| -> csvman_sqlite::Result<TableSummary> {
            let sample = db.sample_rows(&info.name, limit)?;
            Ok(TableSummary { info, sample })
        })
        .collect::<csvman_sqlite::Result<Vec<_>>>()
        .map_err(|e| e.to_string())?;

    if summaries.is_empty() {
        println!("No tables in '{}'.", db.path().display());
        return Ok(());
    }
    print!("{}", format_summaries(&summaries, args.format.into())?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Import and query
// ---------------------------------------------------------------------------

fn run_import(config: &ManagerConfig, args: ImportArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let batch = normalize_path(&args.file, args.mime.as_deref())
        .map_err(|e| format!("Failed to read '{}': {e}", args.file.display()))?;

    let exists = db
        .list_tables()
        .map_err(|e| e.to_string())?
        .iter()
        .any(|t| t.eq_ignore_ascii_case(&args.table));
    let mode = match args.mode {
        Some(mode) => mode.into(),
        None if exists => config.default_import_mode,
        None => ImportMode::Replace,
    };

    println!(
        "Preview of '{}' ({} rows, {} columns):",
        args.file.display(),
        batch.row_count(),
        batch.column_count()
    );
    print!(
        "{}",
        format_result(&batch.head(config.sample_rows), OutputFormat::Table)?
    );

    let report = db
        .write_table(&args.table, &batch, mode)
        .map_err(|e| e.to_string())?;
    println!(
        "Imported {} rows into '{}' ({}) in '{}'.",
        report.rows_written,
        report.table,
        report.mode,
        db.path().display()
    );
    Ok(())
}

fn run_query(config: &ManagerConfig, args: QueryArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let result = db.run_query(&args.sql).map_err(|e| e.to_string())?;

    if let Some(changed) = result.rows_affected {
        println!("Statement executed. {changed} row(s) affected.");
        return Ok(());
    }

    let limit = config.display_limit(args.limit);
    let format: OutputFormat = args.format.into();
    print!("{}", format_result(&result.head(limit), format)?);
    if format == OutputFormat::Table {
        if result.row_count() > limit {
            println!("({} of {} rows shown)", limit, result.row_count());
        } else {
            println!("({} rows)", result.row_count());
        }
    }

    if args.export {
        let path = export_csv(&result, &config.export_dir)
            .map_err(|e| format!("Export failed: {e}"))?;
        eprintln!("Exported {} rows to {}", result.row_count(), path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Schema changes
// ---------------------------------------------------------------------------

fn run_alter_column(config: &ManagerConfig, args: AlterColumnArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    let report = db
        .change_column_type(&args.table, &args.column, &args.new_type)
        .map_err(|e| e.to_string())?;
    println!(
        "Changed '{}.{}' from {} to {} ({} rows copied).",
        report.table, report.column, report.previous_type, report.new_type, report.rows_copied
    );
    Ok(())
}

fn run_drop_table(config: &ManagerConfig, args: DropTableArgs) -> Result<(), String> {
    let db = open_database(config, &args.db);
    if !args.yes {
        return Err(format!(
            "table '{}' in '{}' was not dropped: pass --yes to confirm",
            args.table,
            db.path().display()
        ));
    }
    db.drop_table(&args.table).map_err(|e| e.to_string())?;
    println!("Dropped table '{}' from '{}'.", args.table, db.path().display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolves a database name against the configured data directory.
fn open_database(config: &ManagerConfig, name: &str) -> Database {
    Database::new(database_path(&config.data_dir, name))
}
