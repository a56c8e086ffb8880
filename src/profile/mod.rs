//! Read-only table profiling.
//!
//! [`Profiler`] is what the HTTP API talks to; [`PgProfiler`] answers it with
//! SQL against PostgreSQL catalogs and the profiled table itself.

pub mod ident;
pub mod model;
pub mod postgres;
pub mod queries;

pub use ident::{sanitize_ident, IdentError, TableRef};
pub use model::{ColumnInfo, ColumnMetrics, HistogramBucket, NumericStats, RowStats, TableSummary};
pub use postgres::PgProfiler;

use crate::executor::DbError;

pub trait Profiler {
    /// Base tables outside the system schemas, ordered by schema and name.
    fn list_tables(&self) -> Result<Vec<TableRef>, DbError>;

    /// Columns in ordinal order; empty when the table does not exist.
    fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, DbError>;

    /// `None` when the table does not exist.
    fn summarize(&self, table: &TableRef) -> Result<Option<TableSummary>, DbError>;

    /// Equal-width histogram of a numeric column; `column` must exist.
    fn histogram(&self, table: &TableRef, column: &str, buckets: i32) -> Result<Vec<HistogramBucket>, DbError>;

    /// Up to `limit` rows as JSON values, ordered like `columns`.
    fn preview(
        &self,
        table: &TableRef,
        columns: &[String],
        limit: i64,
    ) -> Result<Vec<Vec<serde_json::Value>>, DbError>;
}
