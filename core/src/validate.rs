//! Identifier and row validation.
//!
//! Table and column names are interpolated into generated SQL, so they are
//! restricted to plain identifiers. Filter, ordering and column-list
//! expressions are raw SQL by contract and are not checked here.
//!
//! # Examples
//!
//! ```
//! use docstore_core::*;
//!
//! assert!(validate_identifier("files").is_ok());
//! assert!(validate_identifier("files; DROP TABLE x").is_err());
//!
//! let columns = vec![
//!     ColumnDefinition::new("id", "INTEGER PRIMARY KEY"),
//!     ColumnDefinition::new("id", "TEXT"),
//! ];
//! assert!(validate_columns(&columns).is_err());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{ColumnDefinition, Row};

/// Validation failures raised before a statement is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Row or column data has the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A table or column name is not a plain identifier.
    #[error("invalid identifier '{0}': must be alphanumeric or underscore and not start with a digit")]
    InvalidIdentifier(String),
}

/// Checks that `name` is a plain SQL identifier.
pub fn validate_identifier(name: &str) -> Result<(), ValidationError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier(name.to_string()))
    }
}

/// Checks a column list for `CREATE TABLE`.
///
/// The list must be non-empty, every name a valid identifier, and names
/// unique within the table.
pub fn validate_columns(columns: &[ColumnDefinition]) -> Result<(), ValidationError> {
    if columns.is_empty() {
        return Err(ValidationError::InvalidArgument(
            "a table needs at least one column".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for column in columns {
        validate_identifier(&column.name)?;
        if !seen.insert(column.name.as_str()) {
            return Err(ValidationError::InvalidArgument(format!(
                "duplicate column: {}",
                column.name
            )));
        }
    }
    Ok(())
}

/// Checks a row used for insert or update.
pub fn validate_row(row: &Row) -> Result<(), ValidationError> {
    if row.is_empty() {
        return Err(ValidationError::InvalidArgument(
            "row data must contain at least one column".to_string(),
        ));
    }
    row.columns().try_for_each(validate_identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("files").is_ok());
        assert!(validate_identifier("_tmp").is_ok());
        assert!(validate_identifier("Doc_2").is_ok());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2files").is_err());
        assert!(validate_identifier("my table").is_err());
        assert!(validate_identifier("files;--").is_err());
        assert!(validate_identifier("naïve").is_err());
    }

    #[test]
    fn test_validate_columns_rejects_empty() {
        assert!(matches!(
            validate_columns(&[]),
            Err(ValidationError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_columns_rejects_bad_name() {
        let columns = vec![ColumnDefinition::new("bad name", "TEXT")];
        assert!(matches!(
            validate_columns(&columns),
            Err(ValidationError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_validate_row() {
        assert!(validate_row(&Row::new()).is_err());
        assert!(validate_row(&Row::new().with("path", "a.md")).is_ok());
        assert!(matches!(
            validate_row(&Row::new().with("path = 1 --", "a.md")),
            Err(ValidationError::InvalidIdentifier(_))
        ));
    }
}
