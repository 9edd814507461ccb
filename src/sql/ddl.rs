//! Quoting helpers and CREATE statement builders
//!
//! Object names arriving from the browser or from user forms are never
//! interpolated raw into SQL: values go through [`quote_literal`], identifiers
//! through [`quote_ident`]. The builders carry the table/view creation form
//! rules: plain identifiers only, a view body is a single SELECT.

use crate::error::{SqlError, SqlResult};

/// Quote a string for use as a SQL literal (`'...'`, embedded quotes doubled)
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quote a name for use as a SQL identifier (`"..."`, embedded quotes doubled)
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Schema-qualified, quoted object name
pub fn qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Whether `name` is a plain SQL identifier: letter or underscore first,
/// letters, digits and underscores after.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Put a newline after every statement terminator for readability.
///
/// DDL-reflection builtins return single-line text; this matches how the
/// detail panel displays it.
pub fn normalize_ddl(ddl: &str) -> String {
    ddl.replace(';', ";\n")
}

/// One column of a CREATE TABLE form
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    /// Type name as chosen from the form's fixed list (not validated here)
    pub data_type: String,
    pub nullable: bool,
    pub primary_key: bool,
}

/// Build a CREATE TABLE statement from form input.
///
/// Validates identifiers, requires at least one column and at most one
/// primary key. A primary-key column never gets a redundant NOT NULL.
pub fn build_create_table(
    schema: &str,
    table: &str,
    columns: &[ColumnSpec],
) -> SqlResult<String> {
    if !is_valid_identifier(table) {
        return Err(SqlError::InvalidIdentifier(table.to_string()));
    }
    if !is_valid_identifier(schema) {
        return Err(SqlError::InvalidIdentifier(schema.to_string()));
    }
    if columns.is_empty() {
        return Err(SqlError::NoColumns);
    }
    if columns.iter().filter(|c| c.primary_key).count() > 1 {
        return Err(SqlError::MultiplePrimaryKeys);
    }

    let mut definitions = Vec::with_capacity(columns.len());
    for col in columns {
        if !is_valid_identifier(&col.name) {
            return Err(SqlError::InvalidIdentifier(col.name.clone()));
        }
        let mut def = format!("{} {}", quote_ident(&col.name), col.data_type);
        if col.primary_key {
            def.push_str(" PRIMARY KEY");
        } else if !col.nullable {
            def.push_str(" NOT NULL");
        }
        definitions.push(def);
    }

    Ok(format!(
        "CREATE TABLE {} (\n{}\n)",
        qualified(schema, table),
        definitions
            .iter()
            .map(|d| format!("  {}", d))
            .collect::<Vec<_>>()
            .join(",\n")
    ))
}

/// Build a CREATE VIEW statement from form input.
///
/// The body must be a single SELECT: it has to start with the keyword and may
/// not contain a statement separator. The general query path performs no such
/// checks; this guard exists only here.
pub fn build_create_view(schema: &str, view: &str, body: &str) -> SqlResult<String> {
    if !is_valid_identifier(view) {
        return Err(SqlError::InvalidIdentifier(view.to_string()));
    }
    if !is_valid_identifier(schema) {
        return Err(SqlError::InvalidIdentifier(schema.to_string()));
    }

    let body = body.trim();
    if !body.to_lowercase().starts_with("select") {
        return Err(SqlError::NotSelect);
    }
    if body.contains(';') {
        return Err(SqlError::MultipleStatements);
    }

    Ok(format!(
        "CREATE VIEW {} AS\n{}",
        qualified(schema, view),
        body
    ))
}
