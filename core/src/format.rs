//! SQL literal and text-table rendering.
//!
//! Generated statements are only ever *displayed* with literal values; the
//! executed path always binds parameters. The helpers here produce the
//! human-readable previews used by dry runs and destructive-operation
//! warnings.

use crate::{Row, Value};

/// Renders a value as an SQL literal for preview text.
///
/// Text is single-quoted with embedded quotes doubled, booleans become
/// `1`/`0`, `NULL` is literal, and blobs use the `X'..'` hex form.
///
/// # Examples
///
/// ```
/// use docstore_core::{Value, format_sql_value};
///
/// assert_eq!(format_sql_value(&Value::from("it's")), "'it''s'");
/// assert_eq!(format_sql_value(&Value::Boolean(true)), "1");
/// assert_eq!(format_sql_value(&Value::Null), "NULL");
/// assert_eq!(format_sql_value(&Value::Integer(42)), "42");
/// ```
pub fn format_sql_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Boolean(b) => i64::from(*b).to_string(),
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}

/// Quotes a table or column name for SQL, doubling embedded `"`.
///
/// Names read back from the catalog are not guaranteed to be plain
/// identifiers, so statements built from them quote every name.
///
/// # Examples
///
/// ```
/// use docstore_core::quote_identifier;
///
/// assert_eq!(quote_identifier("files"), "\"files\"");
/// assert_eq!(quote_identifier("my-notes"), "\"my-notes\"");
/// assert_eq!(quote_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Renders a value for a table cell (no quoting).
fn format_cell(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Boolean(b) => b.to_string(),
        Value::Blob(bytes) => format!("<{} bytes>", bytes.len()),
        other => format_sql_value(other),
    }
}

/// Renders rows as an aligned text table with an index column.
///
/// Columns are the union of all row columns in first-seen order. Returns an
/// empty string when `rows` is empty.
///
/// # Examples
///
/// ```
/// use docstore_core::{Row, render_rows_table};
///
/// let rows = vec![Row::new().with("id", 1).with("path", "a.md")];
/// let table = render_rows_table(&rows);
/// assert!(table.contains("path"));
/// assert!(table.contains("a.md"));
/// ```
pub fn render_rows_table(rows: &[Row]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut headers: Vec<&str> = vec!["(index)"];
    for row in rows {
        for column in row.columns() {
            if !headers.contains(&column) {
                headers.push(column);
            }
        }
    }

    let body: Vec<Vec<String>> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let mut cells = vec![index.to_string()];
            cells.extend(
                headers[1..]
                    .iter()
                    .map(|column| row.get(column).map(format_cell).unwrap_or_default()),
            );
            cells
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            body.iter()
                .map(|cells| cells[i].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| format!(" {cell:<w$} "))
            .collect::<Vec<_>>()
            .join("|")
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = vec![line(&header_cells), separator];
    out.extend(body.iter().map(|cells| line(cells)));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sql_value_escapes_quotes() {
        assert_eq!(format_sql_value(&Value::from("O'Brien's")), "'O''Brien''s'");
        assert_eq!(format_sql_value(&Value::from("")), "''");
    }

    #[test]
    fn test_format_sql_value_scalars() {
        assert_eq!(format_sql_value(&Value::Boolean(false)), "0");
        assert_eq!(format_sql_value(&Value::Real(1.5)), "1.5");
        assert_eq!(format_sql_value(&Value::Integer(-3)), "-3");
        assert_eq!(format_sql_value(&Value::Blob(vec![0x0a, 0xff])), "X'0AFF'");
    }

    #[test]
    fn test_quote_identifier_keeps_spaces_and_dashes() {
        assert_eq!(quote_identifier("my notes"), "\"my notes\"");
        assert_eq!(quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_render_rows_table_empty() {
        assert_eq!(render_rows_table(&[]), "");
    }

    #[test]
    fn test_render_rows_table_aligns_columns() {
        let rows = vec![
            Row::new().with("id", 1).with("path", "a.md"),
            Row::new().with("id", 2).with("path", "guides/long-name.md"),
        ];
        let table = render_rows_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("(index)"));
        assert!(lines[3].contains("guides/long-name.md"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn test_render_rows_table_unions_columns() {
        let rows = vec![Row::new().with("a", 1), Row::new().with("b", "x")];
        let table = render_rows_table(&rows);
        let header = table.lines().next().unwrap();
        assert!(header.contains('a') && header.contains('b'));
    }
}
