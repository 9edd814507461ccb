//! Catalog introspection
//!
//! A fixed battery of read-only queries against the system catalogs, layered
//! over any [`Database`] as default trait methods. Introspection never
//! mutates state and never caches: every tree expansion re-queries the
//! catalog, and errors are reported, never retried.
//!
//! Names are injected as quoted literals (and the count/paging targets as
//! quoted identifiers), so quote-bearing object names are handled safely.

use crate::db::provider::Database;
use crate::db::types::ResultSet;
use crate::error::{DbError, DbResult};
use crate::sql::{normalize_ddl, qualified, quote_literal};
use async_trait::async_trait;

/// One column of a table, as the browser displays it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// `format_type()` output, e.g. "character varying(255)"
    pub data_type: String,
    /// Inverse of the catalog's not-null flag
    pub nullable: bool,
}

/// Catalog accessors available on every database backend
#[async_trait]
pub trait Catalog: Database {
    /// All non-system schemas, alphabetical.
    ///
    /// Excludes the `pg_` prefix plus `information_schema` and CockroachDB's
    /// `crdb_internal`.
    async fn schemas(&self) -> DbResult<Vec<String>> {
        let result = self
            .execute_mapping(
                "SELECT n.nspname AS schema_name \
                 FROM pg_catalog.pg_namespace n \
                 WHERE n.nspname NOT LIKE 'pg_%' \
                   AND n.nspname <> 'information_schema' \
                   AND n.nspname <> 'crdb_internal' \
                 ORDER BY n.nspname",
            )
            .await?;
        Ok(result.first_column_strings())
    }

    /// Table names in a schema, alphabetical
    async fn tables(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT tablename FROM pg_tables \
             WHERE schemaname = {} \
             ORDER BY tablename",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// View names in a schema, alphabetical
    async fn views(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT c.relname AS viewname \
             FROM pg_catalog.pg_class c \
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relkind = 'v' AND n.nspname = {} \
             ORDER BY c.relname",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// Materialized view names in a schema, alphabetical
    async fn materialized_views(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT matviewname FROM pg_matviews \
             WHERE schemaname = {} \
             ORDER BY matviewname",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// Index names in a schema, alphabetical
    async fn indexes(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT indexname FROM pg_indexes \
             WHERE schemaname = {} \
             ORDER BY indexname",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// Routine names in a schema, alphabetical
    async fn functions(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT routine_name FROM information_schema.routines \
             WHERE routine_schema = {} \
             ORDER BY routine_name",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// Trigger names in a schema, alphabetical
    async fn triggers(&self, schema: &str) -> DbResult<Vec<String>> {
        let sql = format!(
            "SELECT trigger_name FROM information_schema.triggers \
             WHERE trigger_schema = {} \
             ORDER BY trigger_name",
            quote_literal(schema)
        );
        Ok(self.execute_mapping(&sql).await?.first_column_strings())
    }

    /// Columns of a table, in physical column order
    async fn table_columns(&self, schema: &str, table: &str) -> DbResult<Vec<ColumnInfo>> {
        let sql = format!(
            "SELECT a.attname AS column_name, \
                    pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type, \
                    NOT a.attnotnull AS is_nullable \
             FROM pg_catalog.pg_attribute a \
             JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
             JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
             WHERE n.nspname = {} AND c.relname = {} \
               AND a.attnum > 0 AND NOT a.attisdropped \
             ORDER BY a.attnum",
            quote_literal(schema),
            quote_literal(table)
        );
        let result = self.execute_mapping(&sql).await?;

        let mut columns = Vec::with_capacity(result.len());
        for (idx, _) in result.rows.iter().enumerate() {
            let name = result
                .value(idx, "column_name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let data_type = result
                .value(idx, "data_type")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let nullable = result
                .value(idx, "is_nullable")
                .and_then(|v| v.as_bool())
                .unwrap_or(true);
            columns.push(ColumnInfo {
                name,
                data_type,
                nullable,
            });
        }
        Ok(columns)
    }

    /// Exact row count of a table
    async fn table_row_count(&self, schema: &str, table: &str) -> DbResult<i64> {
        let sql = format!(
            "SELECT count(*) AS count FROM {}",
            qualified(schema, table)
        );
        let result = self.execute_mapping(&sql).await?;
        result
            .value(0, "count")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| DbError::QueryFailed("count query returned no rows".to_string()))
    }

    /// One page of table data
    async fn table_rows(
        &self,
        schema: &str,
        table: &str,
        limit: usize,
        offset: usize,
    ) -> DbResult<ResultSet> {
        let sql = format!(
            "SELECT * FROM {} LIMIT {} OFFSET {}",
            qualified(schema, table),
            limit,
            offset
        );
        self.execute_mapping(&sql).await
    }

    /// Reconstructed CREATE for a function
    async fn function_ddl(&self, schema: &str, name: &str) -> DbResult<String> {
        let sql = format!(
            "SELECT pg_get_functiondef(p.oid) AS ddl \
             FROM pg_proc p \
             JOIN pg_namespace n ON n.oid = p.pronamespace \
             WHERE p.proname = {} AND n.nspname = {}",
            quote_literal(name),
            quote_literal(schema)
        );
        single_ddl(self.execute_mapping(&sql).await?, "function", name)
    }

    /// Reconstructed CREATE for a view
    async fn view_ddl(&self, schema: &str, name: &str) -> DbResult<String> {
        let sql = format!(
            "SELECT 'CREATE OR REPLACE VIEW ' || table_schema || '.' || table_name || \
                    ' AS ' || view_definition AS ddl \
             FROM information_schema.views \
             WHERE table_schema = {} AND table_name = {}",
            quote_literal(schema),
            quote_literal(name)
        );
        single_ddl(self.execute_mapping(&sql).await?, "view", name)
    }

    /// Reconstructed CREATE for an index
    async fn index_ddl(&self, schema: &str, name: &str) -> DbResult<String> {
        let sql = format!(
            "SELECT pg_get_indexdef(i.indexrelid) AS ddl \
             FROM pg_index i \
             JOIN pg_class c ON c.oid = i.indexrelid \
             JOIN pg_namespace n ON n.oid = c.relnamespace \
             WHERE c.relname = {} AND n.nspname = {}",
            quote_literal(name),
            quote_literal(schema)
        );
        single_ddl(self.execute_mapping(&sql).await?, "index", name)
    }

    /// Reconstructed CREATE for a trigger
    async fn trigger_ddl(&self, schema: &str, name: &str) -> DbResult<String> {
        let sql = format!(
            "SELECT 'CREATE TRIGGER ' || trigger_name || ' ' || action_timing || ' ' || \
                    event_manipulation || ' ON ' || event_object_table || \
                    ' FOR EACH ROW EXECUTE FUNCTION ' || action_statement AS ddl \
             FROM information_schema.triggers \
             WHERE trigger_schema = {} AND trigger_name = {}",
            quote_literal(schema),
            quote_literal(name)
        );
        single_ddl(self.execute_mapping(&sql).await?, "trigger", name)
    }
}

// Every backend gets the catalog battery for free.
impl<D: Database + ?Sized> Catalog for D {}

/// First row's `ddl` column, terminator-normalized; empty result means the
/// object does not exist.
fn single_ddl(result: ResultSet, kind: &'static str, name: &str) -> DbResult<String> {
    match result.value(0, "ddl").and_then(|v| v.as_str()) {
        Some(ddl) => Ok(normalize_ddl(ddl)),
        None => Err(DbError::NotFound {
            kind,
            name: name.to_string(),
        }),
    }
}
