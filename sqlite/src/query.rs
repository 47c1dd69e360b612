//! Query executor: parameterized reads and writes.
//!
//! Executed statements always bind row values as parameters. Literal
//! values only appear in the preview text produced for dry runs. Filter,
//! ordering and column-list expressions are inserted verbatim; they are
//! trusted application input, never end-user input.

use std::time::Instant;

use docstore_core::{Row, format_sql_value, render_rows_table, validate_identifier, validate_row};
use rusqlite::params_from_iter;

use crate::audit::AuditCategory;
use crate::convert::{bind_row, query_rows};
use crate::database::Database;
use crate::error::{DalError, Result};
use crate::options::QueryOptions;

/// Generates a `SELECT` with optional `WHERE`, `ORDER BY` and `LIMIT`.
pub(crate) fn select_sql(table: &str, columns: Option<&str>, opts: &QueryOptions) -> String {
    let columns = columns.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("*");
    let mut sql = format!("SELECT {columns} FROM {table}");
    if let Some(filter) = &opts.filter {
        sql.push_str(&format!("\nWHERE {filter}"));
    }
    if let Some(order_by) = &opts.order_by {
        sql.push_str(&format!("\nORDER BY {order_by}"));
    }
    if let Some(limit) = opts.limit.filter(|limit| *limit > 0) {
        sql.push_str(&format!("\nLIMIT {limit}"));
    }
    sql.push(';');
    sql
}

/// Generates the executed `INSERT` with numbered placeholders.
pub(crate) fn insert_sql(table: &str, columns: &[String]) -> String {
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({}) VALUES ({placeholders})",
        columns.join(", ")
    )
}

fn literal_values(row: &Row, columns: &[String]) -> String {
    columns
        .iter()
        .map(|column| row.get(column).map_or_else(|| "NULL".to_string(), format_sql_value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generates a human-readable `INSERT` with literal values.
pub(crate) fn insert_preview_sql(table: &str, row: &Row) -> String {
    let columns: Vec<String> = row.columns().map(String::from).collect();
    format!(
        "INSERT INTO {table} ({})\nVALUES ({});",
        columns.join(", "),
        literal_values(row, &columns)
    )
}

/// Generates a multi-row `INSERT` preview showing at most `sample` rows.
pub(crate) fn insert_many_preview_sql(
    table: &str,
    columns: &[String],
    rows: &[Row],
    sample: usize,
) -> String {
    let values = rows
        .iter()
        .take(sample)
        .map(|row| format!("    ({})", literal_values(row, columns)))
        .collect::<Vec<_>>()
        .join(",\n");
    let more = if rows.len() > sample {
        format!("\n    -- ... and {} more rows", rows.len() - sample)
    } else {
        String::new()
    };
    format!(
        "INSERT INTO {table} ({})\nVALUES\n{values}{more};",
        columns.join(", ")
    )
}

/// Generates the executed `UPDATE` with numbered placeholders.
pub(crate) fn update_sql(table: &str, columns: &[String], filter: Option<&str>) -> String {
    let assignments = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    match filter {
        Some(filter) => format!("UPDATE {table} SET {assignments} WHERE {filter}"),
        None => format!("UPDATE {table} SET {assignments}"),
    }
}

/// Generates a human-readable `UPDATE` with literal values.
pub(crate) fn update_preview_sql(table: &str, row: &Row, filter: Option<&str>) -> String {
    let assignments = row
        .iter()
        .map(|(column, value)| format!("    {column} = {}", format_sql_value(value)))
        .collect::<Vec<_>>()
        .join(",\n");
    match filter {
        Some(filter) => format!("UPDATE {table}\nSET\n{assignments}\nWHERE {filter};"),
        None => format!("UPDATE {table}\nSET\n{assignments};"),
    }
}

pub(crate) fn delete_sql(table: &str, filter: &str) -> String {
    format!("DELETE FROM {table}\nWHERE {filter};")
}

impl Database {
    /// Reads rows from `table`.
    ///
    /// `columns` is a raw column-list expression and defaults to `*`.
    /// `opts.filter`, `opts.order_by` and `opts.limit` shape the query.
    /// Rows come back in engine order; no match yields an empty vector. A
    /// dry run previews the statement and returns no rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use docstore_core::ColumnDefinition;
    /// use docstore_sqlite::{Database, QueryOptions};
    ///
    /// let db = Database::open_in_memory().unwrap();
    /// db.create_table("files", &[ColumnDefinition::new("path", "TEXT")], &QueryOptions::new())
    ///     .unwrap();
    ///
    /// let opts = QueryOptions::new().filter("path = 'a.md'").silent();
    /// assert!(db.get_data("files", Some("path"), &opts).unwrap().is_empty());
    /// ```
    pub fn get_data(
        &self,
        table: &str,
        columns: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<Vec<Row>> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Select", table, e))?;

        let sql = select_sql(table, columns, opts);
        if opts.dry_run {
            self.preview(opts, &sql);
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = query_rows(&mut stmt, [])?;
        self.log(
            opts,
            AuditCategory::Select,
            format!("{} rows from \"{table}\"", rows.len()),
        );
        Ok(rows)
    }

    /// Inserts one row into `table`.
    ///
    /// # Errors
    ///
    /// Returns [`DalError::InvalidArgument`] for an empty row,
    /// [`DalError::UnknownColumn`] if the table exists but lacks one of the
    /// row's columns, or [`DalError::Engine`] if SQLite rejects the insert.
    pub fn insert_data(&self, table: &str, row: &Row, opts: &QueryOptions) -> Result<&Self> {
        let started = Instant::now();
        validate_identifier(table).map_err(|e| self.reject(opts, "Insert", table, e))?;
        validate_row(row).map_err(|e| self.reject(opts, "Insert", table, e))?;
        let columns: Vec<String> = row.columns().map(String::from).collect();
        self.check_columns(table, &columns)
            .map_err(|e| self.reject(opts, "Insert", table, e))?;

        if opts.dry_run {
            self.preview(opts, &insert_preview_sql(table, row));
            return Ok(self);
        }

        let json = serde_json::to_string(row).map_err(|e| {
            self.reject(opts, "Insert", table, DalError::InvalidArgument(e.to_string()))
        })?;
        self.conn.execute(
            &insert_sql(table, &columns),
            params_from_iter(bind_row(row, &columns)),
        )?;
        self.log(
            opts,
            AuditCategory::Insert,
            format!(
                "INTO \"{table}\": {json}, Took {}ms",
                started.elapsed().as_millis()
            ),
        );
        Ok(self)
    }

    /// Inserts `rows` into `table` in a single transaction.
    ///
    /// The column set is taken from the first row; later rows are bound by
    /// column name, with missing columns bound as `NULL` and extra columns
    /// ignored. Either every row is committed or none is.
    ///
    /// # Errors
    ///
    /// Returns [`DalError::InvalidArgument`] for an empty slice or an empty
    /// first row, and otherwise the same errors as
    /// [`insert_data`](Self::insert_data).
    pub fn insert_many(&self, table: &str, rows: &[Row], opts: &QueryOptions) -> Result<&Self> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Insert", table, e))?;
        let Some(first) = rows.first() else {
            return Err(self.reject(
                opts,
                "Insert",
                table,
                DalError::InvalidArgument("data must be a non-empty array".to_string()),
            ));
        };
        validate_row(first).map_err(|e| self.reject(opts, "Insert", table, e))?;
        let columns: Vec<String> = first.columns().map(String::from).collect();
        self.check_columns(table, &columns)
            .map_err(|e| self.reject(opts, "Insert", table, e))?;

        if opts.dry_run {
            let sql =
                insert_many_preview_sql(table, &columns, rows, self.config.bulk_preview_limit);
            self.preview(opts, &sql);
            return Ok(self);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(&insert_sql(table, &columns))?;
            for row in rows {
                stmt.execute(params_from_iter(bind_row(row, &columns)))?;
            }
        }
        tx.commit()?;

        self.log(
            opts,
            AuditCategory::Insert,
            format!("{} rows into \"{table}\"", rows.len()),
        );
        Ok(self)
    }

    /// Updates rows of `table` matching `filter`.
    ///
    /// Unlike [`delete_data`](Self::delete_data), a missing filter is
    /// accepted and updates **every** row; callers must guard against that
    /// themselves. A filter that is present but blank is rejected with
    /// [`DalError::InvalidArgument`].
    pub fn update_data(
        &self,
        table: &str,
        row: &Row,
        filter: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<&Self> {
        validate_identifier(table).map_err(|e| self.reject(opts, "Update", table, e))?;
        validate_row(row).map_err(|e| self.reject(opts, "Update", table, e))?;
        let columns: Vec<String> = row.columns().map(String::from).collect();
        self.check_columns(table, &columns)
            .map_err(|e| self.reject(opts, "Update", table, e))?;
        let filter = match filter.map(str::trim) {
            Some("") => {
                return Err(self.reject(
                    opts,
                    "Update",
                    table,
                    DalError::InvalidArgument("where clause must not be blank".to_string()),
                ));
            }
            other => other,
        };

        if opts.dry_run {
            self.preview(opts, &update_preview_sql(table, row, filter));
            return Ok(self);
        }

        let changes = self.conn.execute(
            &update_sql(table, &columns, filter),
            params_from_iter(bind_row(row, &columns)),
        )?;
        let scope = filter.map_or_else(|| "(all rows)".to_string(), |f| format!("WHERE {f}"));
        self.log(
            opts,
            AuditCategory::Update,
            format!("{changes} rows in \"{table}\" {scope}"),
        );
        Ok(self)
    }

    /// Deletes rows of `table` matching `filter`.
    ///
    /// A missing or blank filter is always rejected. Matching rows are
    /// previewed as a warning and, unless `opts.force` is set, the
    /// confirmation gate decides whether to proceed. Declining returns
    /// normally without deleting anything.
    ///
    /// # Errors
    ///
    /// Returns [`DalError::MissingFilter`] before any query is built when
    /// `filter` is absent.
    pub fn delete_data(
        &self,
        table: &str,
        filter: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<&Self> {
        let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) else {
            return Err(self.reject(
                opts,
                "Delete",
                table,
                DalError::MissingFilter {
                    table: table.to_string(),
                },
            ));
        };
        validate_identifier(table).map_err(|e| self.reject(opts, "Delete", table, e))?;

        let sql = delete_sql(table, filter);
        if opts.dry_run {
            self.preview(opts, &sql);
            return Ok(self);
        }

        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {table} WHERE {filter}"))?;
        let matching = query_rows(&mut stmt, [])?;
        drop(stmt);

        if matching.is_empty() {
            self.log(
                opts,
                AuditCategory::Warn,
                format!("No rows match the condition: {filter}"),
            );
            return Ok(self);
        }

        let limit = self.config.delete_preview_limit;
        self.log(
            opts,
            AuditCategory::Warn,
            format!(
                "The following {} row(s) will be DELETED from \"{table}\":\n{}",
                matching.len(),
                render_rows_table(&matching[..matching.len().min(limit)])
            ),
        );
        if matching.len() > limit {
            self.log(
                opts,
                AuditCategory::Warn,
                format!("... and {} more rows", matching.len() - limit),
            );
        }

        let prompt = format!(
            "Are you sure you want to delete {} row(s)?",
            matching.len()
        );
        if !self.gate(opts, &prompt, "Delete cancelled by user")? {
            return Ok(self);
        }

        let changes = self.conn.execute(&sql, [])?;
        self.log(
            opts,
            AuditCategory::Delete,
            format!("{changes} rows from \"{table}\" WHERE {filter}"),
        );
        Ok(self)
    }

    /// Rejects row columns the table does not have.
    ///
    /// An unknown table is left for the engine to report.
    fn check_columns(&self, table: &str, columns: &[String]) -> Result<()> {
        let known = self.get_table_schema(table, &QueryOptions::new().silent())?;
        if known.is_empty() {
            return Ok(());
        }
        match columns
            .iter()
            .find(|column| !known.iter().any(|k| k.name.eq_ignore_ascii_case(column)))
        {
            Some(column) => Err(DalError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            }),
            None => Ok(()),
        }
    }
}
