//! Database abstraction layer
//!
//! A trait-based seam over database operations, the concrete tokio-postgres
//! backend, and the catalog-introspection battery built on top of it.

pub mod catalog;
pub mod postgres;
pub mod provider;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types
pub use catalog::{Catalog, ColumnInfo};
pub use postgres::PgDatabase;
pub use provider::Database;
pub use types::{CellValue, ColumnDef, DataType, QueryOutcome, ResultSet, Row};
