//! Row and schema type definitions.
//!
//! This module defines the engine-independent data model used by the data
//! access layer: scalar [`Value`]s, ordered [`Row`]s, and the
//! [`ColumnDefinition`]s that make up a [`TableSchema`]. The types are
//! designed for serialization with [`serde`] so rows can travel through
//! JSON front ends unchanged.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::validate::ValidationError;

/// A single scalar stored in (or bound to) a table cell.
///
/// # Examples
///
/// ```
/// use docstore_core::Value;
///
/// assert_eq!(Value::from("a.md"), Value::Text("a.md".to_string()));
/// assert_eq!(Value::from(Option::<i64>::None), Value::Null);
/// assert_eq!(Value::from(true), Value::Boolean(true));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// SQL `NULL`.
    #[default]
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// Double precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Boolean, stored by the engine as `1`/`0`.
    Boolean(bool),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl Value {
    /// Converts a JSON scalar into a value.
    ///
    /// Arrays and objects are not scalars and are rejected.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ValidationError> {
        match value {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Boolean(b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Integer(i)),
                None => n.as_f64().map(Value::Real).ok_or_else(|| {
                    ValidationError::InvalidArgument(format!("unrepresentable number: {n}"))
                }),
            },
            serde_json::Value::String(s) => Ok(Value::Text(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                ValidationError::InvalidArgument("column values must be scalars".to_string()),
            ),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Real(r) => serializer.serialize_f64(*r),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Blob(b) => serializer.serialize_bytes(b),
        }
    }
}

/// An ordered mapping from column name to [`Value`].
///
/// Column order is insertion order and determines the column order of
/// generated statements. Setting an existing column replaces its value in
/// place.
///
/// # Examples
///
/// ```
/// use docstore_core::{Row, Value};
///
/// let row = Row::new()
///     .with("path", "guides/intro.md")
///     .with("title", "Intro")
///     .with("path", "guides/start.md");
///
/// assert_eq!(row.len(), 2);
/// assert_eq!(row.columns().collect::<Vec<_>>(), ["path", "title"]);
/// assert_eq!(row.get("path"), Some(&Value::from("guides/start.md")));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Sets a column, replacing the previous value if the column exists.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Returns the value stored under `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column names in order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    /// `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cells.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl TryFrom<serde_json::Value> for Row {
    type Error = ValidationError;

    /// Accepts a JSON object of scalars.
    ///
    /// Arrays and non-object values are rejected with
    /// [`ValidationError::InvalidArgument`].
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => {
                let mut row = Row::new();
                for (column, cell) in map {
                    row.set(column, Value::from_json(cell)?);
                }
                Ok(row)
            }
            serde_json::Value::Array(_) => Err(ValidationError::InvalidArgument(
                "row data must be an object, not an array".to_string(),
            )),
            _ => Err(ValidationError::InvalidArgument(
                "row data must be an object".to_string(),
            )),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (column, value) in &self.cells {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Parses a JSON array of objects into rows for a bulk insert.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidArgument`] if `value` is not an
/// array, is empty, or contains an element that is not a row object.
pub fn rows_from_json(value: serde_json::Value) -> Result<Vec<Row>, ValidationError> {
    match value {
        serde_json::Value::Array(items) if items.is_empty() => Err(
            ValidationError::InvalidArgument("data must be a non-empty array".to_string()),
        ),
        serde_json::Value::Array(items) => items.into_iter().map(Row::try_from).collect(),
        _ => Err(ValidationError::InvalidArgument(
            "data must be a non-empty array".to_string(),
        )),
    }
}

/// A single column of a table definition.
///
/// The type is an opaque string handed verbatim to the engine, e.g.
/// `"INTEGER PRIMARY KEY"` or `"TEXT NOT NULL"`.
///
/// # Examples
///
/// ```
/// use docstore_core::ColumnDefinition;
///
/// let id = ColumnDefinition::new("id", "INTEGER PRIMARY KEY");
/// assert_eq!(id.to_string(), "id INTEGER PRIMARY KEY");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Column type and constraints, passed through to DDL.
    #[serde(rename = "type")]
    pub column_type: String,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
        }
    }
}

impl fmt::Display for ColumnDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.column_type.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.column_type)
        }
    }
}

/// Ordered column definitions of one table.
pub type TableSchema = Vec<ColumnDefinition>;
