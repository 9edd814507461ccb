//! Error types for pgnav
//!
//! This module defines the error hierarchy used throughout the crate.
//! We use `thiserror` for library-style errors with clear error chains.

use std::io;

/// Main error type for the pgnav application
#[derive(Debug, thiserror::Error)]
pub enum PgnavError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Statement building errors
    #[error("SQL error: {0}")]
    Sql(#[from] SqlError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Database operation errors
///
/// Driver errors are translated into this taxonomy exactly once, at the raw
/// driver call inside the `db` module; no `tokio_postgres::Error` escapes it.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Failed to establish connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Query execution failed (the session was rolled back and stays usable)
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Operation attempted on a closed connection
    #[error("no active connection")]
    NotConnected,

    /// A catalog object lookup came back empty
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
}

/// Configuration loading/parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Home directory not found
    #[error("Could not determine home directory")]
    NoHomeDir,

    /// Reading or writing the connections file failed
    #[error("Connections file error: {0}")]
    Io(#[from] io::Error),

    /// Failed to parse JSON
    #[error("Failed to parse connections file: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Connection profile not found
    #[error("Connection profile '{0}' not found")]
    ProfileNotFound(String),
}

/// Statement builder validation errors
#[derive(Debug, thiserror::Error)]
pub enum SqlError {
    /// Name is not a plain SQL identifier
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    /// Table definition has no columns
    #[error("A table needs at least one column")]
    NoColumns,

    /// More than one column marked as primary key
    #[error("Only one primary key column is allowed")]
    MultiplePrimaryKeys,

    /// View body does not start with SELECT
    #[error("A view definition must start with SELECT")]
    NotSelect,

    /// Body contains a statement separator
    #[error("Multiple SQL statements are not allowed")]
    MultipleStatements,
}

/// Specialized Result type for pgnav operations
pub type Result<T> = std::result::Result<T, PgnavError>;

/// Specialized Result type for database operations
pub type DbResult<T> = std::result::Result<T, DbError>;

/// Specialized Result type for config operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized Result type for statement building
pub type SqlResult<T> = std::result::Result<T, SqlError>;
