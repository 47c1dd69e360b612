//! Error types for data access operations.
//!
//! Validation errors are raised before any statement reaches the engine;
//! engine errors are propagated unchanged and never retried. Declining a
//! confirmation prompt is not an error.

use docstore_core::ValidationError;
use thiserror::Error;

/// Errors that can occur during data access operations.
#[derive(Debug, Error)]
pub enum DalError {
    /// Row data or a column list has the wrong shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A table or column name is not a plain identifier.
    #[error("invalid identifier '{0}': must be alphanumeric or underscore and not start with a digit")]
    InvalidIdentifier(String),

    /// A row names a column the target table does not have.
    #[error("unknown column '{column}' for table \"{table}\"")]
    UnknownColumn { table: String, column: String },

    /// A delete was requested without a where clause.
    #[error("where clause is required for deletion from \"{table}\"")]
    MissingFilter { table: String },

    /// SQLite rejected a statement or could not open the database.
    #[error("database error: {0}")]
    Engine(#[from] rusqlite::Error),

    /// Reading a confirmation answer or a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed or serialized.
    #[error("config error: {0}")]
    Config(String),
}

impl From<ValidationError> for DalError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidArgument(msg) => DalError::InvalidArgument(msg),
            ValidationError::InvalidIdentifier(name) => DalError::InvalidIdentifier(name),
        }
    }
}

impl From<serde_yaml::Error> for DalError {
    fn from(err: serde_yaml::Error) -> Self {
        DalError::Config(err.to_string())
    }
}

/// Convenience alias for results with [`DalError`].
pub type Result<T> = std::result::Result<T, DalError>;
