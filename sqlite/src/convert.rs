//! Conversion between [`Value`]/[`Row`] and SQLite types.
//!
//! Values are always bound as parameters on the executed path; booleans
//! are bound as integers, which is how SQLite stores them anyway. Reads
//! map SQLite storage classes back onto [`Value`] and keep the engine's
//! column order.

use docstore_core::{Row, Value};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{Params, Statement};

use crate::error::Result;

/// Converts a [`Value`] to an owned SQLite value for binding.
pub(crate) fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
        Value::Boolean(b) => SqlValue::Integer(i64::from(*b)),
        Value::Blob(bytes) => SqlValue::Blob(bytes.clone()),
    }
}

/// Converts a borrowed SQLite value into a [`Value`].
///
/// Text that is not valid UTF-8 is decoded lossily.
pub(crate) fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

/// Binds `columns` of `row` in order; missing columns bind `NULL`.
pub(crate) fn bind_row<'a>(
    row: &'a Row,
    columns: &'a [String],
) -> impl Iterator<Item = SqlValue> + 'a {
    columns
        .iter()
        .map(move |column| row.get(column).map_or(SqlValue::Null, to_sql))
}

/// Runs a prepared query and collects every result row.
pub(crate) fn query_rows<P: Params>(stmt: &mut Statement<'_>, params: P) -> Result<Vec<Row>> {
    let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let rows = stmt
        .query_map(params, |sql_row| {
            let mut row = Row::new();
            for (index, name) in names.iter().enumerate() {
                row.set(name.clone(), from_sql(sql_row.get_ref(index)?));
            }
            Ok(row)
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
