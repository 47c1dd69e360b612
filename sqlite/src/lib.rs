//! SQLite data access layer for docstore.
//!
//! This crate wraps a single SQLite connection in a [`Database`] handle that
//! provides schema management, parameterized CRUD, transactional bulk
//! inserts, dry-run previews, confirmation-gated destructive operations and
//! full-database backup.
//!
//! # Architecture
//!
//! - **`database`**: the handle, its builder and shared plumbing
//! - **`schema`**: create/drop/exists/introspect tables
//! - **`query`**: select/insert/insert-many/update/delete
//! - **`backup`**: copy every table into another database file
//! - **`confirm`**: the yes/no gate consulted before deletes and drops
//! - **`audit`**: categorized operation log, injected at construction
//! - **`config`**: YAML-loadable preview limits and pragmas
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use docstore_core::{ColumnDefinition, Row};
//! use docstore_sqlite::{AutoConfirm, Database, MemoryAudit, QueryOptions};
//!
//! let audit = Arc::new(MemoryAudit::new());
//! let db = Database::builder(":memory:")
//!     .audit(audit.clone())
//!     .confirm(AutoConfirm(true))
//!     .open()
//!     .unwrap();
//!
//! let opts = QueryOptions::new();
//! db.create_table(
//!     "files",
//!     &[
//!         ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
//!         ColumnDefinition::new("path", "TEXT"),
//!     ],
//!     &opts,
//! )
//! .unwrap()
//! .insert_data("files", &Row::new().with("path", "a.md"), &opts)
//! .unwrap()
//! .delete_data("files", Some("id = 1"), &opts)
//! .unwrap();
//!
//! assert_eq!(db.row_count("files").unwrap(), 0);
//! ```
//!
//! # Trust boundary
//!
//! Filter (`WHERE`), ordering (`ORDER BY`) and column-list expressions are
//! raw SQL inserted verbatim so they can express arbitrary conditions. They
//! must originate from application code and never from end-user input.
//! Row values are always bound as parameters.

mod audit;
mod backup;
mod config;
mod confirm;
mod convert;
mod database;
mod error;
mod options;
mod query;
mod schema;

pub use audit::{AuditCategory, AuditEvent, AuditSink, MemoryAudit, NoopAudit, TracingAudit};
pub use config::DalConfig;
pub use confirm::{AutoConfirm, Confirm, StdinConfirm, is_affirmative};
pub use database::{Database, DatabaseBuilder};
pub use error::{DalError, Result};
pub use options::QueryOptions;
