//! Database provider trait
//!
//! The seam between everything that issues SQL and the concrete driver.
//! Keeping this a trait allows mock backends in tests and, eventually, other
//! wire-compatible servers behind the same registry and browser code.

use crate::config::ConnectionConfig;
use crate::db::types::{QueryOutcome, ResultSet};
use crate::error::DbResult;
use async_trait::async_trait;

/// One live database session.
///
/// Implementations own exactly one session; nothing shares it or calls it
/// concurrently. All query operations require a connected handle and return
/// [`DbError::NotConnected`](crate::error::DbError::NotConnected) otherwise,
/// without touching the wire.
#[async_trait]
pub trait Database: Send + Sync {
    /// Open a session from the given parameters.
    ///
    /// # Errors
    /// `DbError::ConnectionFailed` on any driver-level failure (auth,
    /// network, name resolution); never leaves a half-open handle behind.
    async fn connect(config: &ConnectionConfig) -> DbResult<Self>
    where
        Self: Sized;

    /// Whether the session is open and has not reported a connection loss
    fn is_connected(&self) -> bool;

    /// Run one SQL statement.
    ///
    /// Statements whose metadata carries columns come back as positional
    /// rows; everything else comes back as an affected-row count. On
    /// execution failure the current transaction is rolled back best-effort
    /// and the session remains usable.
    async fn execute(&self, sql: &str) -> DbResult<QueryOutcome>;

    /// Run one SQL statement, returning rows with by-name column access.
    ///
    /// Used for introspection queries and the tabular result view. Same
    /// rollback-on-error contract as [`execute`](Database::execute).
    async fn execute_mapping(&self, sql: &str) -> DbResult<ResultSet>;

    /// Release the session. Idempotent; safe on an already-failed connection.
    async fn close(&mut self);
}
