//! Schema manager: create, drop and introspect tables.
//!
//! Generated DDL uses `IF [NOT] EXISTS` throughout, so repeated calls are
//! no-ops at the engine level. Column types are opaque strings passed
//! verbatim into `CREATE TABLE`.

use docstore_core::{
    ColumnDefinition, TableSchema, quote_identifier, render_rows_table, validate_columns,
    validate_identifier,
};
use rusqlite::params;

use crate::audit::AuditCategory;
use crate::convert::query_rows;
use crate::database::Database;
use crate::error::Result;
use crate::options::QueryOptions;

/// Lists user tables, skipping SQLite's internal `sqlite_*` catalog tables.
pub(crate) const LIST_TABLES_SQL: &str =
    "SELECT name\nFROM sqlite_master\nWHERE type='table'\n  AND name NOT LIKE 'sqlite_%'\nORDER BY rowid;";

/// Generates `CREATE TABLE IF NOT EXISTS` with one clause per column, in
/// the given order.
pub(crate) fn create_table_sql(table: &str, columns: &[ColumnDefinition]) -> String {
    let column_defs = columns
        .iter()
        .map(|column| format!("    {column}"))
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS {table} (\n{column_defs}\n);")
}

pub(crate) fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {table};")
}

fn table_exists_sql(table: &str) -> String {
    format!("SELECT 1 FROM sqlite_master WHERE type='table' AND name='{table}';")
}

fn table_info_sql(table: &str) -> String {
    format!("PRAGMA table_info({table});")
}

/// One row of `PRAGMA table_info`.
struct ColumnInfo {
    name: String,
    /// Declared type, empty when the column was declared without one.
    column_type: String,
    not_null: bool,
    default: Option<String>,
    pk: i64,
}

impl Database {
    /// Creates `table` with `columns` unless it already exists.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidIdentifier`](crate::DalError::InvalidIdentifier) for
    /// a malformed table or column name,
    /// [`InvalidArgument`](crate::DalError::InvalidArgument) for an empty or
    /// duplicated column list, or [`Engine`](crate::DalError::Engine) if
    /// SQLite rejects the statement.
    pub fn create_table(
        &self,
        table: &str,
        columns: &[ColumnDefinition],
        opts: &QueryOptions,
    ) -> Result<&Self> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Create", table, e))?;
        validate_columns(columns).map_err(|e| self.reject(opts, "Create", table, e))?;

        let sql = create_table_sql(table, columns);
        if opts.dry_run {
            self.preview(opts, &sql);
            return Ok(self);
        }

        self.conn.execute_batch(&sql)?;
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        self.log(
            opts,
            AuditCategory::Create,
            format!("Created table: {table} ({})", names.join(", ")),
        );
        Ok(self)
    }

    /// Drops `table` after previewing its contents and confirming.
    ///
    /// A missing table is a warning, not an error. Unless `opts.force` is
    /// set the confirmation gate is consulted; declining leaves the table in
    /// place and returns normally.
    pub fn drop_table(&self, table: &str, opts: &QueryOptions) -> Result<&Self> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Drop", table, e))?;

        let sql = drop_table_sql(table);
        if opts.dry_run {
            self.preview(opts, &sql);
            return Ok(self);
        }

        if !self.table_exists(table, &QueryOptions::new().silent())? {
            self.log(
                opts,
                AuditCategory::Warn,
                format!("Table \"{table}\" does not exist"),
            );
            return Ok(self);
        }

        let row_count = self.row_count(table)?;
        let schema = self.get_table_schema(table, &QueryOptions::new().silent())?;
        let mut stmt = self.conn.prepare(&format!(
            "SELECT * FROM {table} LIMIT {}",
            self.config.drop_sample_limit
        ))?;
        let sample = query_rows(&mut stmt, [])?;
        drop(stmt);

        let columns: Vec<String> = schema
            .iter()
            .map(|c| format!("{} ({})", c.name, c.column_type))
            .collect();
        self.log(
            opts,
            AuditCategory::Warn,
            format!("TABLE \"{table}\" WILL BE PERMANENTLY DELETED!"),
        );
        self.log(
            opts,
            AuditCategory::Warn,
            format!("Columns: {}", columns.join(", ")),
        );
        self.log(opts, AuditCategory::Warn, format!("Total rows: {row_count}"));
        if !sample.is_empty() {
            self.log(
                opts,
                AuditCategory::Warn,
                format!("Sample data:\n{}", render_rows_table(&sample)),
            );
        }

        let prompt = format!(
            "Are you sure you want to DROP table \"{table}\" with {row_count} row(s)? THIS CANNOT BE UNDONE!"
        );
        if !self.gate(opts, &prompt, "Drop cancelled by user")? {
            return Ok(self);
        }

        self.conn.execute_batch(&sql)?;
        self.log(
            opts,
            AuditCategory::Drop,
            format!("TABLE \"{table}\" ({row_count} rows deleted)"),
        );
        Ok(self)
    }

    /// Returns `true` if a table named `table` exists.
    ///
    /// A dry run only previews the catalog query and reports `false`.
    pub fn table_exists(&self, table: &str, opts: &QueryOptions) -> Result<bool> {
        if opts.dry_run {
            self.preview(opts, &table_exists_sql(table));
            return Ok(false);
        }
        let found = self
            .conn
            .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1")?
            .exists(params![table])?;
        Ok(found)
    }

    /// Returns the column definitions of `table` as reported by SQLite.
    ///
    /// Columns declared without a type are reported as `TEXT`. An unknown
    /// table yields an empty schema. A dry run only previews the pragma.
    pub fn get_table_schema(&self, table: &str, opts: &QueryOptions) -> Result<TableSchema> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Schema", table, e))?;
        if opts.dry_run {
            self.preview(opts, &table_info_sql(table));
            return Ok(Vec::new());
        }
        Ok(self
            .column_info(table)?
            .into_iter()
            .map(|info| {
                let column_type = if info.column_type.is_empty() {
                    "TEXT".to_string()
                } else {
                    info.column_type
                };
                ColumnDefinition::new(info.name, column_type)
            })
            .collect())
    }

    /// Lists user tables in creation order.
    pub fn list_tables(&self, opts: &QueryOptions) -> Result<Vec<String>> {
        if opts.dry_run {
            self.preview(opts, LIST_TABLES_SQL);
            return Ok(Vec::new());
        }
        let mut stmt = self.conn.prepare(LIST_TABLES_SQL)?;
        let tables = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.log(
            opts,
            AuditCategory::Schema,
            format!("Tables: [{}]", tables.join(", ")),
        );
        Ok(tables)
    }

    /// Counts the rows of `table`.
    pub fn row_count(&self, table: &str) -> Result<u64> {
        validate_identifier(table)?;
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Column definitions suitable for re-creating `table` elsewhere.
    ///
    /// Unlike [`get_table_schema`](Self::get_table_schema) these carry the
    /// `NOT NULL`, `DEFAULT` and single-column `PRIMARY KEY` constraints, so
    /// a backup keeps rowid aliasing and defaults. An untyped column stays
    /// untyped so its affinity is unchanged. Composite primary keys are table
    /// constraints and are not reproduced.
    pub(crate) fn recreate_columns(&self, table: &str) -> Result<TableSchema> {
        let infos = self.column_info(table)?;
        let single_pk = infos.iter().filter(|info| info.pk > 0).count() == 1;
        Ok(infos
            .into_iter()
            .map(|info| {
                let mut parts = Vec::new();
                if !info.column_type.is_empty() {
                    parts.push(info.column_type);
                }
                if single_pk && info.pk > 0 {
                    parts.push("PRIMARY KEY".to_string());
                }
                if info.not_null {
                    parts.push("NOT NULL".to_string());
                }
                if let Some(default) = info.default {
                    parts.push(format!("DEFAULT ({default})"));
                }
                ColumnDefinition::new(info.name, parts.join(" "))
            })
            .collect())
    }

    /// Reads `PRAGMA table_info`; the name is quoted, so catalog names that
    /// are not plain identifiers work too.
    fn column_info(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({});", quote_identifier(table)))?;
        let infos = stmt
            .query_map([], |row| {
                let column_type: Option<String> = row.get("type")?;
                Ok(ColumnInfo {
                    name: row.get("name")?,
                    column_type: column_type.map(|t| t.trim().to_string()).unwrap_or_default(),
                    not_null: row.get::<_, i64>("notnull")? != 0,
                    default: row.get("dflt_value")?,
                    pk: row.get("pk")?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(infos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuditCategory, AutoConfirm, MemoryAudit};
    use std::sync::Arc;

    fn files_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
            ColumnDefinition::new("path", "TEXT"),
        ]
    }

    #[test]
    fn test_create_table_sql_layout() {
        let sql = create_table_sql("files", &files_columns());
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS files (\n    id INTEGER PRIMARY KEY,\n    path TEXT\n);"
        );
    }

    #[test]
    fn test_drop_table_sql() {
        assert_eq!(drop_table_sql("files"), "DROP TABLE IF EXISTS files;");
    }

    #[test]
    fn test_get_table_schema_substitutes_text_for_untyped() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch("CREATE TABLE loose (id INTEGER, anything);")
            .unwrap();
        let schema = db.get_table_schema("loose", &QueryOptions::new()).unwrap();
        assert_eq!(
            schema,
            [
                ColumnDefinition::new("id", "INTEGER"),
                ColumnDefinition::new("anything", "TEXT"),
            ]
        );
    }

    #[test]
    fn test_get_table_schema_unknown_table_is_empty() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_table_schema("nope", &QueryOptions::new()).unwrap().is_empty());
    }

    #[test]
    fn test_recreate_columns_keeps_constraints() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch(
                "CREATE TABLE docs (id INTEGER PRIMARY KEY, title TEXT NOT NULL DEFAULT 'Untitled', added TEXT DEFAULT (datetime('now')));",
            )
            .unwrap();
        let columns = db.recreate_columns("docs").unwrap();
        assert_eq!(
            columns[..2],
            [
                ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
                ColumnDefinition::new("title", "TEXT NOT NULL DEFAULT ('Untitled')"),
            ]
        );
        assert!(columns[2].column_type.starts_with("TEXT DEFAULT ("));
        assert!(columns[2].column_type.contains("datetime('now')"));

        // The generated definitions must be accepted back by the engine.
        db.create_table("docs_copy", &columns, &QueryOptions::new()).unwrap();
        assert_eq!(
            db.get_table_schema("docs_copy", &QueryOptions::new()).unwrap(),
            db.get_table_schema("docs", &QueryOptions::new()).unwrap()
        );
    }

    #[test]
    fn test_recreate_columns_keeps_untyped_columns_untyped() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch("CREATE TABLE loose (id INTEGER PRIMARY KEY, anything, strict_free NOT NULL);")
            .unwrap();
        assert_eq!(
            db.recreate_columns("loose").unwrap(),
            [
                ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
                ColumnDefinition::new("anything", ""),
                ColumnDefinition::new("strict_free", "NOT NULL"),
            ]
        );
        // The reported schema still substitutes TEXT.
        assert_eq!(
            db.get_table_schema("loose", &QueryOptions::new()).unwrap()[1],
            ColumnDefinition::new("anything", "TEXT")
        );
    }

    #[test]
    fn test_recreate_columns_reads_tables_needing_quotes() {
        let db = Database::open_in_memory().unwrap();
        db.conn
            .execute_batch(r#"CREATE TABLE "my-notes" ("body text" TEXT);"#)
            .unwrap();
        assert_eq!(
            db.recreate_columns("my-notes").unwrap(),
            [ColumnDefinition::new("body text", "TEXT")]
        );
    }

    #[test]
    fn test_list_tables_excludes_internal() {
        let db = Database::open_in_memory().unwrap();
        let opts = QueryOptions::new();
        db.create_table("a", &files_columns(), &opts)
            .unwrap()
            .create_table(
                "b",
                &[ColumnDefinition::new("id", "INTEGER PRIMARY KEY AUTOINCREMENT")],
                &opts,
            )
            .unwrap();
        // AUTOINCREMENT creates sqlite_sequence
        assert_eq!(db.list_tables(&opts).unwrap(), ["a", "b"]);
    }

    #[test]
    fn test_drop_missing_table_warns() {
        let audit = Arc::new(MemoryAudit::new());
        let db = Database::builder(":memory:")
            .audit(audit.clone())
            .confirm(AutoConfirm(true))
            .open()
            .unwrap();
        db.drop_table("ghost", &QueryOptions::new()).unwrap();
        assert_eq!(
            audit.messages(AuditCategory::Warn),
            ["Table \"ghost\" does not exist"]
        );
        assert!(audit.messages(AuditCategory::Drop).is_empty());
    }

    #[test]
    fn test_create_table_rejects_duplicate_columns() {
        let db = Database::open_in_memory().unwrap();
        let columns = vec![
            ColumnDefinition::new("id", "INTEGER"),
            ColumnDefinition::new("id", "TEXT"),
        ];
        let err = db
            .create_table("dup", &columns, &QueryOptions::new())
            .unwrap_err();
        assert!(matches!(err, crate::DalError::InvalidArgument(_)));
        assert!(!db.table_exists("dup", &QueryOptions::new()).unwrap());
    }
}
