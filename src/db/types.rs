//! Database type definitions
//!
//! Core data structures for representing query results, data types, and
//! cell values.

use std::time::Duration;

/// Outcome of executing one SQL statement.
///
/// A statement either produces a row set (its metadata carries columns) or it
/// is a command, reported as an affected-row count.
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The statement produced rows
    Rows(ResultSet),
    /// The statement was a command (INSERT/UPDATE/DELETE/DDL)
    Command { affected: u64 },
}

impl QueryOutcome {
    /// Human-readable one-line summary for the message panel
    pub fn summary(&self) -> String {
        match self {
            QueryOutcome::Rows(rs) => format!("{} rows", rs.rows.len()),
            QueryOutcome::Command { affected } => format!("Rows affected: {}", affected),
        }
    }
}

/// Rows plus column metadata from a single query.
///
/// Column order always equals the query's projection order, so by-name access
/// ("mapping mode") and positional access are two views of the same data.
#[derive(Debug, Clone)]
pub struct ResultSet {
    /// Column definitions, in projection order
    pub columns: Vec<ColumnDef>,
    /// Result rows
    pub rows: Vec<Row>,
    /// Query execution time
    pub execution_time: Duration,
}

impl ResultSet {
    pub fn new(columns: Vec<ColumnDef>, rows: Vec<Row>, execution_time: Duration) -> Self {
        Self {
            columns,
            rows,
            execution_time,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name (first match wins on duplicates)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Mapping-mode accessor: the value of `name` in row `row`
    pub fn value(&self, row: usize, name: &str) -> Option<&CellValue> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.values.get(idx)
    }

    /// First-column values of every row as strings, skipping NULLs.
    ///
    /// Most catalog listings are single-text-column queries; this is their
    /// common unwrapping.
    pub fn first_column_strings(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|r| r.values.first().and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect()
    }
}

/// Column definition in query results
#[derive(Debug, Clone)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether the column can contain NULL
    pub nullable: bool,
}

/// Database data types, as far as typed cell extraction needs them.
///
/// Anything outside this list is carried as `Unknown` and rendered through
/// the string fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Text,
    Varchar,
    Char,
    Boolean,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Jsonb,
    Bytea,
    Uuid,
    Unknown(String),
}

impl DataType {
    /// Get a human-readable display name for this type
    pub fn display_name(&self) -> String {
        match self {
            DataType::SmallInt => "smallint".to_string(),
            DataType::Integer => "integer".to_string(),
            DataType::BigInt => "bigint".to_string(),
            DataType::Real => "real".to_string(),
            DataType::Double => "double precision".to_string(),
            DataType::Numeric => "numeric".to_string(),
            DataType::Text => "text".to_string(),
            DataType::Varchar => "varchar".to_string(),
            DataType::Char => "char".to_string(),
            DataType::Boolean => "boolean".to_string(),
            DataType::Date => "date".to_string(),
            DataType::Time => "time".to_string(),
            DataType::Timestamp => "timestamp".to_string(),
            DataType::TimestampTz => "timestamptz".to_string(),
            DataType::Json => "json".to_string(),
            DataType::Jsonb => "jsonb".to_string(),
            DataType::Bytea => "bytea".to_string(),
            DataType::Uuid => "uuid".to_string(),
            DataType::Unknown(s) => s.clone(),
        }
    }
}

/// A single row of query results
#[derive(Debug, Clone)]
pub struct Row {
    /// Cell values in column order
    pub values: Vec<CellValue>,
}

/// A cell value (single column value in a row)
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// NULL value
    Null,

    /// Integer value
    Integer(i64),

    /// Floating point value
    Float(f64),

    /// Text/string value
    Text(String),

    /// Boolean value
    Boolean(bool),

    /// JSON value (parsed)
    Json(serde_json::Value),

    /// Binary data
    Binary(Vec<u8>),

    /// Date/time value (rendered as string)
    DateTime(String),

    /// UUID value
    Uuid(String),
}

impl CellValue {
    /// Get a display string for this cell value (truncated if needed)
    pub fn display_string(&self, max_len: usize) -> String {
        let full = match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Json(v) => v.to_string(),
            CellValue::Binary(b) => format!("<binary {} bytes>", b.len()),
            CellValue::DateTime(s) => s.clone(),
            CellValue::Uuid(s) => s.clone(),
        };

        if full.len() > max_len {
            // Back off to a char boundary so multibyte text can't split
            let mut cut = max_len.saturating_sub(3);
            while !full.is_char_boundary(cut) {
                cut -= 1;
            }
            format!("{}...", &full[..cut])
        } else {
            full
        }
    }

    /// Check if this is a NULL value
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Borrow as text-ish string, when the value carries one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::DateTime(s) | CellValue::Uuid(s) => Some(s),
            _ => None,
        }
    }

    /// Read as an integer, when the value is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Read as a boolean, when the value is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}
