//! Backup of every user table into another database file.
//!
//! Tables are copied one at a time: the source schema is re-created in the
//! target with `CREATE TABLE IF NOT EXISTS`, then all rows are inserted in
//! one transaction per table. A failure part-way through leaves the tables
//! already copied in place.
//!
//! Table and column names come from the source catalog rather than from
//! callers, so every statement here quotes them and names that are not
//! plain identifiers are copied too.

use std::path::Path;

use docstore_core::{ColumnDefinition, quote_identifier};
use rusqlite::params_from_iter;

use crate::audit::AuditCategory;
use crate::confirm::AutoConfirm;
use crate::convert::{bind_row, query_rows};
use crate::database::Database;
use crate::error::Result;
use crate::options::QueryOptions;
use crate::query::insert_sql;
use crate::schema::create_table_sql;

/// `CREATE TABLE IF NOT EXISTS` for a catalog table, with quoted names.
fn copy_table_sql(table: &str, columns: &[ColumnDefinition]) -> String {
    let quoted: Vec<ColumnDefinition> = columns
        .iter()
        .map(|c| ColumnDefinition::new(quote_identifier(&c.name), c.column_type.clone()))
        .collect();
    create_table_sql(&quote_identifier(table), &quoted)
}

fn copy_rows_sql(table: &str) -> String {
    let table = quote_identifier(table);
    format!("INSERT INTO {table} SELECT * FROM main.{table};")
}

impl Database {
    /// Copies every user table of this database into `target`.
    ///
    /// The target is opened (and created if absent) with this handle's
    /// audit sink and configuration, and closed once all tables are copied.
    /// A dry run enumerates tables and schemas and previews the DDL and
    /// copy statements without opening the target.
    ///
    /// # Errors
    ///
    /// Fails before touching any table if the target cannot be opened.
    /// Engine errors while copying a table abort the backup; earlier tables
    /// stay committed in the target.
    ///
    /// # Examples
    ///
    /// ```
    /// use docstore_core::{ColumnDefinition, Row};
    /// use docstore_sqlite::{Database, QueryOptions};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let opts = QueryOptions::new();
    /// let db = Database::open(dir.path().join("data.db")).unwrap();
    /// db.create_table("files", &[ColumnDefinition::new("path", "TEXT")], &opts)
    ///     .unwrap()
    ///     .insert_data("files", &Row::new().with("path", "a.md"), &opts)
    ///     .unwrap()
    ///     .backup_database(dir.path().join("backup.db"), &opts)
    ///     .unwrap();
    ///
    /// let backup = Database::open(dir.path().join("backup.db")).unwrap();
    /// assert_eq!(backup.row_count("files").unwrap(), 1);
    /// ```
    pub fn backup_database(&self, target: impl AsRef<Path>, opts: &QueryOptions) -> Result<&Self> {
        let target = target.as_ref();
        let target_name = target.display().to_string();

        if opts.dry_run {
            self.log(
                opts,
                AuditCategory::Debug,
                format!("Backup database \"{}\" → \"{target_name}\"", self.name),
            );
            for table in self.list_tables(&QueryOptions::new().silent())? {
                let columns = self.recreate_columns(&table)?;
                self.preview(opts, &copy_table_sql(&table, &columns));
                self.preview(opts, &copy_rows_sql(&table));
            }
            return Ok(self);
        }

        self.log(
            opts,
            AuditCategory::Backup,
            format!("Starting backup to \"{target_name}\"..."),
        );
        let backup = Database::builder(target)
            .audit(self.audit.clone())
            .confirm(AutoConfirm(false))
            .config(self.config.clone())
            .open()?;

        let step = QueryOptions {
            silent: opts.silent,
            ..QueryOptions::default()
        };
        for table in self.list_tables(&step)? {
            self.copy_table(&backup, &table, &step)?;
        }
        backup.close()?;

        self.log(
            opts,
            AuditCategory::Backup,
            format!("Completed → {target_name}"),
        );
        Ok(self)
    }

    /// Re-creates `table` in `target` and copies every row in one
    /// transaction.
    fn copy_table(&self, target: &Database, table: &str, step: &QueryOptions) -> Result<()> {
        let columns = self.recreate_columns(table)?;
        target.conn.execute_batch(&copy_table_sql(table, &columns))?;
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        target.log(
            step,
            AuditCategory::Create,
            format!("Created table: {table} ({})", names.join(", ")),
        );

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {}", quote_identifier(table)))?;
        let rows = query_rows(&mut stmt, [])?;
        drop(stmt);
        self.log(
            step,
            AuditCategory::Select,
            format!("{} rows from \"{table}\"", rows.len()),
        );
        if rows.is_empty() {
            return Ok(());
        }

        let bound: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let quoted: Vec<String> = bound.iter().map(|name| quote_identifier(name)).collect();
        let tx = target.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql(&quote_identifier(table), &quoted))?;
            for row in &rows {
                stmt.execute(params_from_iter(bind_row(row, &bound)))?;
            }
        }
        tx.commit()?;
        target.log(
            step,
            AuditCategory::Insert,
            format!("{} rows into \"{table}\"", rows.len()),
        );
        Ok(())
    }
}
