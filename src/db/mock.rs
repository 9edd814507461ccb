//! Canned-response database backend for unit tests
//!
//! Responses are matched by substring against the issued SQL, so tests can
//! key on the catalog table a query reads without repeating the whole text.

use crate::config::ConnectionConfig;
use crate::db::provider::Database;
use crate::db::types::{CellValue, ColumnDef, DataType, QueryOutcome, ResultSet, Row};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MockDb {
    pub closed: bool,
    responses: Vec<(String, ResultSet)>,
    /// Every SQL string this mock has been asked to run
    pub executed: Mutex<Vec<String>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned result for any SQL containing `needle`
    pub fn with_response(mut self, needle: &str, result: ResultSet) -> Self {
        self.responses.push((needle.to_string(), result));
        self
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    fn lookup(&self, sql: &str) -> ResultSet {
        self.responses
            .iter()
            .find(|(needle, _)| sql.contains(needle.as_str()))
            .map(|(_, result)| result.clone())
            .unwrap_or_else(empty_result)
    }
}

pub fn empty_result() -> ResultSet {
    ResultSet::new(Vec::new(), Vec::new(), Duration::ZERO)
}

/// Single-or-multi text-column result, the shape of most catalog listings
pub fn text_result(columns: &[&str], rows: &[&[&str]]) -> ResultSet {
    ResultSet::new(
        columns
            .iter()
            .map(|name| ColumnDef {
                name: name.to_string(),
                data_type: DataType::Text,
                nullable: true,
            })
            .collect(),
        rows.iter()
            .map(|row| Row {
                values: row
                    .iter()
                    .map(|v| CellValue::Text(v.to_string()))
                    .collect(),
            })
            .collect(),
        Duration::ZERO,
    )
}

/// Single integer cell, the shape of a count(*) result
pub fn count_result(count: i64) -> ResultSet {
    ResultSet::new(
        vec![ColumnDef {
            name: "count".to_string(),
            data_type: DataType::BigInt,
            nullable: false,
        }],
        vec![Row {
            values: vec![CellValue::Integer(count)],
        }],
        Duration::ZERO,
    )
}

#[async_trait]
impl Database for MockDb {
    async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        if config.host == "unreachable" {
            return Err(DbError::ConnectionFailed(format!(
                "could not connect to {}",
                config.host
            )));
        }
        Ok(Self::new())
    }

    fn is_connected(&self) -> bool {
        !self.closed
    }

    async fn execute(&self, sql: &str) -> DbResult<QueryOutcome> {
        Ok(QueryOutcome::Rows(self.execute_mapping(sql).await?))
    }

    async fn execute_mapping(&self, sql: &str) -> DbResult<ResultSet> {
        if self.closed {
            return Err(DbError::NotConnected);
        }
        self.executed.lock().unwrap().push(sql.to_string());
        Ok(self.lookup(sql))
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}
