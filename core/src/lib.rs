//! Core row and schema types for the docstore data access layer.
//!
//! This crate defines the engine-independent pieces shared by the SQLite
//! backend and its front ends:
//!
//! - [`Value`]: a scalar cell value.
//! - [`Row`]: an ordered column → value mapping.
//! - [`ColumnDefinition`] / [`TableSchema`]: table structure, with column
//!   types passed verbatim to the engine.
//!
//! Formatting ([`format_sql_value`], [`render_rows_table`]) produces the
//! literal-value previews used by dry runs and warnings. Validation
//! ([`validate_identifier`], [`validate_columns`], [`validate_row`]) rejects
//! malformed input before any statement is built.
//!
//! # Example
//!
//! ```
//! use docstore_core::*;
//!
//! let columns = vec![
//!     ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
//!     ColumnDefinition::new("path", "TEXT"),
//! ];
//! assert!(validate_columns(&columns).is_ok());
//!
//! let row = Row::new().with("path", "a.md");
//! assert!(validate_row(&row).is_ok());
//! assert_eq!(format_sql_value(row.get("path").unwrap()), "'a.md'");
//! ```

mod format;
mod types;
mod validate;

pub use format::{format_sql_value, quote_identifier, render_rows_table};
pub use types::*;
pub use validate::{ValidationError, validate_columns, validate_identifier, validate_row};
