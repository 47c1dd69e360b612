mod logging;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use docstore_core::{ColumnDefinition, Row, rows_from_json};
use docstore_sqlite::{DalConfig, Database, QueryOptions, StdinConfirm, TracingAudit};

use crate::logging::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "docstore")]
#[command(about = "Inspect and maintain a docstore SQLite database")]
struct Cli {
    /// Database file path.
    #[arg(long, global = true, default_value = "data.db")]
    db: PathBuf,
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print the statements that would run without executing them.
    #[arg(long, global = true)]
    dry_run: bool,
    /// Skip confirmation prompts for deletes and drops.
    #[arg(long, global = true)]
    force: bool,
    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Log line format.
    #[arg(long, global = true, value_enum, default_value = "plain")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List user tables.
    Tables,
    /// Print the column definitions of a table as JSON.
    Schema(TableArgs),
    /// Create a table from `name:TYPE` column specs.
    Create(CreateArgs),
    /// Print rows as JSON.
    Get(GetArgs),
    /// Insert a JSON object, or a JSON array of objects in one transaction.
    Insert(InsertArgs),
    /// Update rows from a JSON object.
    Update(UpdateArgs),
    /// Delete rows matching a where clause.
    Delete(DeleteArgs),
    /// Drop a table.
    Drop(TableArgs),
    /// Copy every table into another database file.
    Backup(BackupArgs),
    /// Write a default configuration file.
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
struct TableArgs {
    /// Table name.
    table: String,
}

#[derive(Debug, Args)]
struct CreateArgs {
    /// Table name.
    table: String,
    /// Column spec `name:TYPE`, e.g. `id:INTEGER PRIMARY KEY`. Repeatable.
    #[arg(long = "column", required = true)]
    columns: Vec<String>,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Table name.
    table: String,
    /// Column list expression (default: all columns).
    #[arg(long)]
    columns: Option<String>,
    /// Where clause expression.
    #[arg(long = "where")]
    filter: Option<String>,
    /// Order by expression.
    #[arg(long)]
    order_by: Option<String>,
    /// Maximum number of rows.
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Debug, Args)]
struct InsertArgs {
    /// Table name.
    table: String,
    /// Row object or array of row objects.
    #[arg(long)]
    json: String,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    /// Table name.
    table: String,
    /// Column values to set, as a JSON object.
    #[arg(long)]
    json: String,
    /// Where clause expression; omitting it updates every row.
    #[arg(long = "where")]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    /// Table name.
    table: String,
    /// Where clause expression (required).
    #[arg(long = "where")]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct BackupArgs {
    /// Target database file (default: `<db>-backup-<timestamp>.db`).
    target: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct InitConfigArgs {
    /// Where to write the YAML file.
    path: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.dry_run, cli.log_format);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    if let Command::InitConfig(args) = &cli.command {
        return run_init_config(args);
    }

    let config = match &cli.config {
        Some(path) => DalConfig::load(path).map_err(|e| e.to_string())?,
        None => DalConfig::default(),
    };
    let db = Database::builder(&cli.db)
        .audit(Arc::new(TracingAudit))
        .confirm(StdinConfirm)
        .config(config)
        .open()
        .map_err(|e| e.to_string())?;

    let mut opts = QueryOptions::new();
    opts.dry_run = cli.dry_run;
    opts.force = cli.force;

    let result = match cli.command {
        Command::Tables => run_tables(&db, &opts),
        Command::Schema(args) => run_schema(&db, args, &opts),
        Command::Create(args) => run_create(&db, args, &opts),
        Command::Get(args) => run_get(&db, args, opts.clone()),
        Command::Insert(args) => run_insert(&db, args, &opts),
        Command::Update(args) => run_update(&db, args, &opts),
        Command::Delete(args) => run_delete(&db, args, &opts),
        Command::Drop(args) => run_drop(&db, args, &opts),
        Command::Backup(args) => run_backup(&db, &cli.db, args, &opts),
        Command::InitConfig(_) => Ok(()),
    };

    db.close().map_err(|e| e.to_string())?;
    result
}

fn print_json(value: &impl serde::Serialize) -> Result<(), String> {
    let raw = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{raw}");
    Ok(())
}

fn run_tables(db: &Database, opts: &QueryOptions) -> Result<(), String> {
    let tables = db.list_tables(opts).map_err(|e| e.to_string())?;
    print_json(&tables)
}

fn run_schema(db: &Database, args: TableArgs, opts: &QueryOptions) -> Result<(), String> {
    let schema = db
        .get_table_schema(&args.table, opts)
        .map_err(|e| e.to_string())?;
    print_json(&schema)
}

fn run_create(db: &Database, args: CreateArgs, opts: &QueryOptions) -> Result<(), String> {
    let columns: Vec<ColumnDefinition> = args
        .columns
        .iter()
        .map(|spec| parse_column(spec))
        .collect();
    db.create_table(&args.table, &columns, opts)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn run_get(db: &Database, args: GetArgs, mut opts: QueryOptions) -> Result<(), String> {
    opts.filter = args.filter;
    opts.order_by = args.order_by;
    opts.limit = args.limit;
    let rows = db
        .get_data(&args.table, args.columns.as_deref(), &opts)
        .map_err(|e| e.to_string())?;
    print_json(&rows)
}

fn run_insert(db: &Database, args: InsertArgs, opts: &QueryOptions) -> Result<(), String> {
    let value: serde_json::Value = serde_json::from_str(&args.json)
        .map_err(|e| format!("Failed to parse --json: {e}"))?;
    if value.is_array() {
        let rows = rows_from_json(value).map_err(|e| e.to_string())?;
        db.insert_many(&args.table, &rows, opts)
            .map_err(|e| e.to_string())?;
        if !opts.dry_run {
            println!("Inserted {} row(s) into {}.", rows.len(), args.table);
        }
    } else {
        let row = Row::try_from(value).map_err(|e| e.to_string())?;
        db.insert_data(&args.table, &row, opts)
            .map_err(|e| e.to_string())?;
        if !opts.dry_run {
            println!("Inserted 1 row into {}.", args.table);
        }
    }
    Ok(())
}

fn run_update(db: &Database, args: UpdateArgs, opts: &QueryOptions) -> Result<(), String> {
    let value: serde_json::Value = serde_json::from_str(&args.json)
        .map_err(|e| format!("Failed to parse --json: {e}"))?;
    let row = Row::try_from(value).map_err(|e| e.to_string())?;
    db.update_data(&args.table, &row, args.filter.as_deref(), opts)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn run_delete(db: &Database, args: DeleteArgs, opts: &QueryOptions) -> Result<(), String> {
    db.delete_data(&args.table, args.filter.as_deref(), opts)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn run_drop(db: &Database, args: TableArgs, opts: &QueryOptions) -> Result<(), String> {
    db.drop_table(&args.table, opts)
        .map_err(|e| e.to_string())?;
    Ok(())
}

fn run_backup(
    db: &Database,
    db_path: &Path,
    args: BackupArgs,
    opts: &QueryOptions,
) -> Result<(), String> {
    let target = args
        .target
        .unwrap_or_else(|| default_backup_path(db_path, chrono::Utc::now()));
    db.backup_database(&target, opts)
        .map_err(|e| e.to_string())?;
    if !opts.dry_run {
        println!("Backed up {} to {}.", db.name(), target.display());
    }
    Ok(())
}

fn run_init_config(args: &InitConfigArgs) -> Result<(), String> {
    DalConfig::default()
        .save(&args.path)
        .map_err(|e| format!("Failed to write '{}': {e}", args.path.display()))?;
    tracing::info!(path = %args.path.display(), "wrote default configuration");
    Ok(())
}

/// Splits `name:TYPE`; a spec without a colon has an empty type.
fn parse_column(spec: &str) -> ColumnDefinition {
    match spec.split_once(':') {
        Some((name, column_type)) => ColumnDefinition::new(name.trim(), column_type.trim()),
        None => ColumnDefinition::new(spec.trim(), ""),
    }
}

/// `<dir>/<stem>-backup-<UTC timestamp>.db` next to the source database.
fn default_backup_path(db_path: &Path, now: chrono::DateTime<chrono::Utc>) -> PathBuf {
    let stem = db_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let file_name = format!("{stem}-backup-{}.db", now.format("%Y%m%d%H%M%S"));
    db_path.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_column_with_type() {
        assert_eq!(
            parse_column("id:INTEGER PRIMARY KEY"),
            ColumnDefinition::new("id", "INTEGER PRIMARY KEY")
        );
    }

    #[test]
    fn test_parse_column_without_type() {
        assert_eq!(parse_column("notes"), ColumnDefinition::new("notes", ""));
    }

    #[test]
    fn test_default_backup_path() {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            default_backup_path(Path::new("/srv/docs/data.db"), now),
            PathBuf::from("/srv/docs/data-backup-20240309140507.db")
        );
    }
}
