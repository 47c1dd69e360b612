//! The database handle and its construction.
//!
//! A [`Database`] exclusively owns one SQLite connection plus the injected
//! capabilities every operation reports through: an [`AuditSink`] and a
//! [`Confirm`] decision provider. Operations live in the `schema`, `query`
//! and `backup` modules as further `impl Database` blocks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::audit::{AuditCategory, AuditEvent, AuditSink, NoopAudit};
use crate::config::DalConfig;
use crate::confirm::{Confirm, StdinConfirm};
use crate::error::{DalError, Result};
use crate::options::QueryOptions;

/// An open, exclusively owned connection to one database file.
///
/// Mutating operations return `&Database` so calls can be chained with
/// `?`. [`close`](Self::close) consumes the handle, so no operation can be
/// issued after it.
///
/// # Examples
///
/// ```
/// use docstore_core::{ColumnDefinition, Row};
/// use docstore_sqlite::{Database, QueryOptions};
///
/// let db = Database::open_in_memory().unwrap();
/// let opts = QueryOptions::new();
///
/// db.create_table(
///     "files",
///     &[
///         ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
///         ColumnDefinition::new("path", "TEXT"),
///     ],
///     &opts,
/// )
/// .unwrap()
/// .insert_data("files", &Row::new().with("path", "a.md"), &opts)
/// .unwrap();
///
/// let rows = db.get_data("files", None, &opts).unwrap();
/// assert_eq!(rows, [Row::new().with("id", 1).with("path", "a.md")]);
/// db.close().unwrap();
/// ```
pub struct Database {
    pub(crate) conn: Connection,
    pub(crate) name: String,
    pub(crate) audit: Arc<dyn AuditSink>,
    pub(crate) confirm: Box<dyn Confirm>,
    pub(crate) config: DalConfig,
}

impl Database {
    /// Opens (creating if absent) the database at `path` with default
    /// capabilities: no audit output and terminal confirmation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder(path).open()
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::builder(":memory:").open()
    }

    /// Starts configuring a handle for `path`.
    pub fn builder(path: impl AsRef<Path>) -> DatabaseBuilder {
        DatabaseBuilder {
            path: path.as_ref().to_path_buf(),
            audit: Arc::new(NoopAudit),
            confirm: Box::new(StdinConfirm),
            config: DalConfig::default(),
        }
    }

    /// The file name this handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration in effect for this handle.
    pub fn config(&self) -> &DalConfig {
        &self.config
    }

    /// Closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`DalError::Engine`] if SQLite refuses to close, e.g. because
    /// of unfinalized statements.
    pub fn close(self) -> Result<()> {
        let Database {
            conn, name, audit, ..
        } = self;
        conn.close().map_err(|(_, err)| DalError::Engine(err))?;
        audit.record(&AuditEvent::new(
            AuditCategory::Close,
            format!("Closed database: {name}"),
        ));
        Ok(())
    }

    /// Records an event unless the call is silent.
    pub(crate) fn log(&self, opts: &QueryOptions, category: AuditCategory, message: impl Into<String>) {
        if !opts.silent {
            self.audit.record(&AuditEvent::new(category, message));
        }
    }

    /// Records a dry-run statement preview.
    pub(crate) fn preview(&self, opts: &QueryOptions, sql: &str) {
        self.log(opts, AuditCategory::Debug, sql);
    }

    /// Records a validation failure and hands the error back.
    pub(crate) fn reject(&self, opts: &QueryOptions, action: &str, table: &str, err: impl Into<DalError>) -> DalError {
        let err = err.into();
        self.log(
            opts,
            AuditCategory::Error,
            format!("{action} failed for \"{table}\": {err}"),
        );
        err
    }

    /// Asks the confirmation gate unless the call is forced.
    ///
    /// Returns `false` (and records a cancellation) when declined.
    pub(crate) fn gate(&self, opts: &QueryOptions, prompt: &str, cancelled: &str) -> Result<bool> {
        if opts.force {
            return Ok(true);
        }
        if self.confirm.confirm(prompt)? {
            Ok(true)
        } else {
            self.log(opts, AuditCategory::Cancel, cancelled);
            Ok(false)
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Configures the capabilities of a [`Database`] before opening it.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use docstore_sqlite::{AutoConfirm, DalConfig, Database, TracingAudit};
///
/// let db = Database::builder(":memory:")
///     .audit(Arc::new(TracingAudit))
///     .confirm(AutoConfirm(false))
///     .config(DalConfig { drop_sample_limit: 2, ..DalConfig::default() })
///     .open()
///     .unwrap();
/// assert_eq!(db.config().drop_sample_limit, 2);
/// ```
pub struct DatabaseBuilder {
    path: PathBuf,
    audit: Arc<dyn AuditSink>,
    confirm: Box<dyn Confirm>,
    config: DalConfig,
}

impl DatabaseBuilder {
    /// Sets the audit sink (defaults to [`NoopAudit`]).
    pub fn audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Sets the confirmation provider (defaults to [`StdinConfirm`]).
    pub fn confirm(mut self, confirm: impl Confirm + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn config(mut self, config: DalConfig) -> Self {
        self.config = config;
        self
    }

    /// Opens the connection, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DalError::Engine`] if the file cannot be opened.
    pub fn open(self) -> Result<Database> {
        let name = self.path.display().to_string();
        let conn = match Connection::open(&self.path) {
            Ok(conn) => conn,
            Err(err) => {
                self.audit.record(&AuditEvent::new(
                    AuditCategory::Error,
                    format!("Failed to open database {name}: {err}"),
                ));
                return Err(err.into());
            }
        };
        if self.config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }

        self.audit.record(&AuditEvent::new(
            AuditCategory::Open,
            format!("Opened database: {name}"),
        ));
        Ok(Database {
            conn,
            name,
            audit: self.audit,
            confirm: self.confirm,
            config: self.config,
        })
    }
}
