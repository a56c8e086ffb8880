//! [`Profiler`] over a PostgreSQL [`Executor`].

use crate::executor::{get, DbError, Executor};
use crate::profile::ident::TableRef;
use crate::profile::model::{
    compared_columns, rows_in_column_order, ColumnInfo, ColumnMetrics, HistogramBucket, NumericStats,
    RowStats, TableSummary,
};
use crate::profile::queries;
use crate::profile::Profiler;

pub struct PgProfiler<E> {
    executor: E,
}

impl<E: Executor> PgProfiler<E> {
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn primary_key_columns(&self, table: &TableRef) -> Result<Vec<String>, DbError> {
        self.executor
            .query_all(queries::PRIMARY_KEY_COLUMNS, &[&table.schema, &table.table])?
            .iter()
            .map(|row| get::<String>(row, 0))
            .collect()
    }

    fn row_stats(&self, table: &TableRef, columns: &[ColumnInfo]) -> Result<RowStats, DbError> {
        let keys = self.primary_key_columns(table)?;
        let compared = compared_columns(columns, &keys);
        let row = self
            .executor
            .query_one(&queries::row_counts(table, &compared), &[])?;
        Ok(RowStats::new(get(&row, 0)?, get(&row, 1)?, compared))
    }

    fn numeric_stats(&self, table: &TableRef, column: &str) -> Result<NumericStats, DbError> {
        let row = self
            .executor
            .query_one(&queries::numeric_stats(table, column), &[])?;
        Ok(NumericStats {
            n: get(&row, 0)?,
            min: get(&row, 1)?,
            max: get(&row, 2)?,
            mean: get(&row, 3)?,
            stddev: get(&row, 4)?,
            q1: get(&row, 5)?,
            median: get(&row, 6)?,
            q3: get(&row, 7)?,
        })
    }

    fn column_metrics(&self, table: &TableRef, column: &ColumnInfo) -> Result<ColumnMetrics, DbError> {
        let row = self
            .executor
            .query_one(&queries::column_counts(table, &column.name), &[])?;

        let mut metrics = ColumnMetrics {
            name: column.name.clone(),
            data_type: column.data_type.clone(),
            nulls: get(&row, 0)?,
            unique: get(&row, 1)?,
            numeric_stats: None,
            numeric_stats_error: None,
        };

        if column.is_numeric() {
            // Reported per column; the rest of the summary still stands.
            match self.numeric_stats(table, &column.name) {
                Ok(stats) => metrics.numeric_stats = Some(stats),
                Err(e) => {
                    log::warn!("numeric stats for {table}.{} failed: {e}", column.name);
                    metrics.numeric_stats_error = Some(e.to_string());
                }
            }
        }

        Ok(metrics)
    }
}

impl<E: Executor> Profiler for PgProfiler<E> {
    fn list_tables(&self) -> Result<Vec<TableRef>, DbError> {
        self.executor
            .query_all(queries::LIST_TABLES, &[])?
            .iter()
            .map(|row| {
                Ok(TableRef {
                    schema: get(row, 0)?,
                    table: get(row, 1)?,
                })
            })
            .collect()
    }

    fn columns(&self, table: &TableRef) -> Result<Vec<ColumnInfo>, DbError> {
        self.executor
            .query_all(queries::TABLE_COLUMNS, &[&table.schema, &table.table])?
            .iter()
            .map(|row| {
                Ok(ColumnInfo {
                    name: get(row, 0)?,
                    data_type: get(row, 1)?,
                })
            })
            .collect()
    }

    fn summarize(&self, table: &TableRef) -> Result<Option<TableSummary>, DbError> {
        let columns = self.columns(table)?;
        if columns.is_empty() {
            return Ok(None);
        }

        let row_stats = self.row_stats(table, &columns)?;
        let columns = columns
            .iter()
            .map(|c| self.column_metrics(table, c))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Some(TableSummary {
            table: table.to_string(),
            row_stats,
            columns,
        }))
    }

    fn histogram(&self, table: &TableRef, column: &str, buckets: i32) -> Result<Vec<HistogramBucket>, DbError> {
        let row = self
            .executor
            .query_one(&queries::histogram_range(table, column), &[])?;
        let n: i64 = get(&row, 0)?;
        let min: Option<f64> = get(&row, 1)?;
        let max: Option<f64> = get(&row, 2)?;

        let (lo, hi) = match (min, max) {
            (Some(lo), Some(hi)) if n > 0 => (lo, hi),
            _ => return Ok(Vec::new()),
        };
        if lo == hi {
            return Ok(vec![HistogramBucket {
                bucket: 1,
                count: n,
                min,
                max,
            }]);
        }

        self.executor
            .query_all(&queries::histogram_buckets(table, column), &[&lo, &hi, &buckets])?
            .iter()
            .map(|row| {
                Ok(HistogramBucket {
                    bucket: get(row, 0)?,
                    count: get(row, 1)?,
                    min,
                    max,
                })
            })
            .collect()
    }

    fn preview(
        &self,
        table: &TableRef,
        columns: &[String],
        limit: i64,
    ) -> Result<Vec<Vec<serde_json::Value>>, DbError> {
        let row = self.executor.query_one(&queries::preview(table), &[&limit])?;
        let json: String = get(&row, 0)?;
        let objects: Vec<serde_json::Value> = serde_json::from_str(&json)
            .map_err(|e| DbError::ParseError(format!("preview of {table}: {e}")))?;
        Ok(rows_in_column_order(objects, columns))
    }
}
