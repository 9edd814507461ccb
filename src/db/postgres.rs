//! PostgreSQL database backend
//!
//! Concrete [`Database`] implementation using tokio-postgres. Also speaks to
//! Postgres-wire-compatible servers such as CockroachDB.

use crate::config::connections::SslMode;
use crate::config::ConnectionConfig;
use crate::db::provider::Database;
use crate::db::types::{CellValue, ColumnDef, DataType, QueryOutcome, ResultSet, Row};
use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_postgres::types::Type;
use tokio_postgres::Client;

/// One live PostgreSQL session
pub struct PgDatabase {
    /// The tokio-postgres client; `None` once closed
    client: Option<Client>,
}

impl PgDatabase {
    /// The open client, or `NotConnected` once closed or after the server
    /// dropped the session.
    fn client(&self) -> DbResult<&Client> {
        match &self.client {
            Some(client) if !client.is_closed() => Ok(client),
            _ => Err(DbError::NotConnected),
        }
    }
}

/// Shared row-fetch path for `execute` and `execute_mapping`
async fn fetch_rows(client: &Client, stmt: &tokio_postgres::Statement) -> DbResult<ResultSet> {
    let start = std::time::Instant::now();

    let columns: Vec<ColumnDef> = stmt
        .columns()
        .iter()
        .map(|col| ColumnDef {
            name: col.name().to_string(),
            data_type: pg_type_to_datatype(col.type_()),
            // Statement metadata does not carry nullability
            nullable: true,
        })
        .collect();

    let pg_rows = match client.query(stmt, &[]).await {
        Ok(rows) => rows,
        Err(e) => return Err(rollback_and_map(client, e).await),
    };

    let mut rows = Vec::with_capacity(pg_rows.len());
    for pg_row in &pg_rows {
        let mut values = Vec::with_capacity(columns.len());
        for (i, col_def) in columns.iter().enumerate() {
            values.push(extract_cell_value(pg_row, i, &col_def.data_type));
        }
        rows.push(Row { values });
    }

    Ok(ResultSet::new(columns, rows, start.elapsed()))
}

#[async_trait]
impl Database for PgDatabase {
    async fn connect(config: &ConnectionConfig) -> DbResult<Self> {
        let conn_string = config.connection_string_with_password();
        let name = config.display_name();

        let client = match config.ssl_mode {
            SslMode::Disable => {
                let (client, connection) =
                    tokio_postgres::connect(&conn_string, tokio_postgres::NoTls)
                        .await
                        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!(connection = %name, error = %e, "connection lost");
                    }
                });
                client
            }
            SslMode::Prefer | SslMode::Require => {
                let tls = tokio_postgres_rustls::MakeRustlsConnect::new(make_tls_config());
                let (client, connection) = tokio_postgres::connect(&conn_string, tls)
                    .await
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
                tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::warn!(connection = %name, error = %e, "connection lost");
                    }
                });
                client
            }
        };

        Ok(Self {
            client: Some(client),
        })
    }

    fn is_connected(&self) -> bool {
        self.client
            .as_ref()
            .is_some_and(|client| !client.is_closed())
    }

    async fn execute(&self, sql: &str) -> DbResult<QueryOutcome> {
        let client = self.client()?;

        let stmt = match client.prepare(sql).await {
            Ok(stmt) => stmt,
            Err(e) => return Err(rollback_and_map(client, e).await),
        };

        // Row-set detection: statements without result columns are commands
        if stmt.columns().is_empty() {
            return match client.execute(&stmt, &[]).await {
                Ok(affected) => Ok(QueryOutcome::Command { affected }),
                Err(e) => Err(rollback_and_map(client, e).await),
            };
        }

        fetch_rows(client, &stmt).await.map(QueryOutcome::Rows)
    }

    async fn execute_mapping(&self, sql: &str) -> DbResult<ResultSet> {
        let client = self.client()?;
        let stmt = match client.prepare(sql).await {
            Ok(stmt) => stmt,
            Err(e) => return Err(rollback_and_map(client, e).await),
        };
        fetch_rows(client, &stmt).await
    }

    async fn close(&mut self) {
        // Dropping the client closes the session; the connection task ends
        self.client = None;
    }
}

/// Best-effort rollback, then translate the driver error.
///
/// This is the single point where `tokio_postgres::Error` becomes `DbError`
/// for execution failures. Rollback failures are swallowed: the usual cause
/// is that no transaction was open in the first place.
async fn rollback_and_map(client: &Client, e: tokio_postgres::Error) -> DbError {
    let _ = client.batch_execute("ROLLBACK").await;
    DbError::QueryFailed(e.to_string())
}

/// Map tokio_postgres Type to our DataType enum
fn pg_type_to_datatype(pg_type: &Type) -> DataType {
    match *pg_type {
        Type::INT2 => DataType::SmallInt,
        Type::INT4 => DataType::Integer,
        Type::INT8 => DataType::BigInt,
        Type::FLOAT4 => DataType::Real,
        Type::FLOAT8 => DataType::Double,
        Type::NUMERIC => DataType::Numeric,
        Type::TEXT | Type::NAME => DataType::Text,
        Type::VARCHAR => DataType::Varchar,
        Type::CHAR | Type::BPCHAR => DataType::Char,
        Type::BOOL => DataType::Boolean,
        Type::DATE => DataType::Date,
        Type::TIME => DataType::Time,
        Type::TIMESTAMP => DataType::Timestamp,
        Type::TIMESTAMPTZ => DataType::TimestampTz,
        Type::JSON => DataType::Json,
        Type::JSONB => DataType::Jsonb,
        Type::BYTEA => DataType::Bytea,
        Type::UUID => DataType::Uuid,
        _ => DataType::Unknown(pg_type.name().to_string()),
    }
}

/// Build a rustls ClientConfig that trusts OS certificates (with Mozilla
/// roots as fallback)
fn make_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();

    let native_certs = rustls_native_certs::load_native_certs();
    let mut loaded = 0;
    for cert in native_certs.certs {
        if root_store.add(cert).is_ok() {
            loaded += 1;
        }
    }
    if loaded == 0 {
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }

    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

/// Extract a cell value from a tokio_postgres Row based on the column's
/// DataType.
///
/// Tries the expected type first, then falls back to string representation
/// when the type doesn't match. Returns CellValue::Null only for actual NULL
/// values or when all fallbacks fail.
fn extract_cell_value(row: &tokio_postgres::Row, idx: usize, data_type: &DataType) -> CellValue {
    match data_type {
        DataType::SmallInt => match row.try_get::<_, Option<i16>>(idx) {
            Ok(Some(v)) => CellValue::Integer(v as i64),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Integer => match row.try_get::<_, Option<i32>>(idx) {
            Ok(Some(v)) => CellValue::Integer(v as i64),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::BigInt => match row.try_get::<_, Option<i64>>(idx) {
            Ok(Some(v)) => CellValue::Integer(v),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Real => match row.try_get::<_, Option<f32>>(idx) {
            Ok(Some(v)) => CellValue::Float(v as f64),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Double => match row.try_get::<_, Option<f64>>(idx) {
            Ok(Some(v)) => CellValue::Float(v),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Numeric => match row.try_get::<_, Option<Decimal>>(idx) {
            Ok(Some(v)) => CellValue::Text(v.to_string()),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Boolean => match row.try_get::<_, Option<bool>>(idx) {
            Ok(Some(v)) => CellValue::Boolean(v),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Json | DataType::Jsonb => {
            match row.try_get::<_, Option<serde_json::Value>>(idx) {
                Ok(Some(v)) => CellValue::Json(v),
                Ok(None) => CellValue::Null,
                Err(_) => try_as_string(row, idx),
            }
        }
        DataType::Bytea => match row.try_get::<_, Option<Vec<u8>>>(idx) {
            Ok(Some(v)) => CellValue::Binary(v),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Uuid => match row.try_get::<_, Option<uuid::Uuid>>(idx) {
            Ok(Some(v)) => CellValue::Uuid(v.to_string()),
            Ok(None) => CellValue::Null,
            Err(_) => try_as_string(row, idx),
        },
        DataType::Timestamp | DataType::TimestampTz | DataType::Date | DataType::Time => {
            match row.try_get::<_, Option<String>>(idx) {
                Ok(Some(v)) => CellValue::DateTime(v),
                Ok(None) => CellValue::Null,
                Err(_) => {
                    // Try chrono types for date/time columns
                    if let Ok(Some(v)) = row.try_get::<_, Option<chrono::NaiveDateTime>>(idx) {
                        return CellValue::DateTime(v.to_string());
                    }
                    if let Ok(Some(v)) =
                        row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
                    {
                        return CellValue::DateTime(v.to_string());
                    }
                    if let Ok(Some(v)) = row.try_get::<_, Option<chrono::NaiveDate>>(idx) {
                        return CellValue::DateTime(v.to_string());
                    }
                    if let Ok(Some(v)) = row.try_get::<_, Option<chrono::NaiveTime>>(idx) {
                        return CellValue::DateTime(v.to_string());
                    }
                    try_as_string(row, idx)
                }
            }
        }
        // Text types and fallback for unknown types
        _ => try_as_string(row, idx),
    }
}

/// Try to extract a value as a string (fallback for type mismatches).
///
/// When even the string fallback fails, includes the postgres type name in
/// the message so the user knows what type couldn't be displayed.
fn try_as_string(row: &tokio_postgres::Row, idx: usize) -> CellValue {
    match row.try_get::<_, Option<String>>(idx) {
        Ok(Some(v)) => CellValue::Text(v),
        Ok(None) => CellValue::Null,
        Err(_) => {
            let type_name = row
                .columns()
                .get(idx)
                .map_or("unknown", |c| c.type_().name());
            CellValue::Text(format!("<unable to display: {}>", type_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pg_type_mapping() {
        assert_eq!(pg_type_to_datatype(&Type::INT8), DataType::BigInt);
        assert_eq!(pg_type_to_datatype(&Type::NAME), DataType::Text);
        assert_eq!(
            pg_type_to_datatype(&Type::INTERVAL),
            DataType::Unknown("interval".to_string())
        );
    }
}
