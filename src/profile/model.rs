//! Profiling results as they are serialized by the API.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Data type names that get numeric statistics.
const NUMERIC_TYPE_MARKERS: [&str; 7] = [
    "integer", "numeric", "double", "real", "bigint", "smallint", "decimal",
];

impl ColumnInfo {
    pub fn is_numeric(&self) -> bool {
        let data_type = self.data_type.to_lowercase();
        NUMERIC_TYPE_MARKERS.iter().any(|m| data_type.contains(m))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowStats {
    pub total_rows: i64,
    pub duplicate_rows: i64,
    pub duplicate_pct: f64,
    /// Columns two rows must agree on to count as duplicates.
    pub compared_columns: Vec<String>,
}

impl RowStats {
    pub fn new(total_rows: i64, distinct_rows: i64, compared_columns: Vec<String>) -> Self {
        let duplicate_rows = total_rows - distinct_rows;
        let duplicate_pct = if total_rows > 0 {
            duplicate_rows as f64 / total_rows as f64
        } else {
            0.0
        };
        Self {
            total_rows,
            duplicate_rows,
            duplicate_pct,
            compared_columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub n: i64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub stddev: Option<f64>,
    pub q1: Option<f64>,
    pub median: Option<f64>,
    pub q3: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMetrics {
    pub name: String,
    pub data_type: String,
    pub nulls: i64,
    pub unique: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats: Option<NumericStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_stats_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub row_stats: RowStats,
    pub columns: Vec<ColumnMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub bucket: i32,
    pub count: i64,
    /// Range of the whole column, repeated on every bucket.
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Non-key columns when there is a primary key, otherwise every column.
pub fn compared_columns(columns: &[ColumnInfo], key_columns: &[String]) -> Vec<String> {
    let non_key: Vec<String> = columns
        .iter()
        .filter(|c| !key_columns.contains(&c.name))
        .map(|c| c.name.clone())
        .collect();
    if non_key.is_empty() {
        columns.iter().map(|c| c.name.clone()).collect()
    } else {
        non_key
    }
}

/// Reorders JSON objects into arrays following `columns`.
pub fn rows_in_column_order(objects: Vec<serde_json::Value>, columns: &[String]) -> Vec<Vec<serde_json::Value>> {
    objects
        .into_iter()
        .map(|object| {
            columns
                .iter()
                .map(|c| object.get(c).cloned().unwrap_or(serde_json::Value::Null))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn col(name: &str, data_type: &str) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    #[test]
    fn test_numeric_detection() {
        for t in ["integer", "numeric", "double precision", "real", "bigint", "smallint", "DECIMAL"] {
            assert!(col("x", t).is_numeric(), "{t}");
        }
        for t in ["text", "date", "boolean", "character varying", "json"] {
            assert!(!col("x", t).is_numeric(), "{t}");
        }
    }

    #[test]
    fn test_row_stats() {
        let stats = RowStats::new(10, 9, vec!["a".into()]);
        assert_eq!(stats.duplicate_rows, 1);
        assert!((stats.duplicate_pct - 0.1).abs() < 1e-12);

        let empty = RowStats::new(0, 0, vec![]);
        assert_eq!(empty.duplicate_pct, 0.0);
    }

    #[test]
    fn test_compared_columns_skip_key() {
        let columns = vec![col("id", "integer"), col("email", "text"), col("age", "integer")];
        assert_eq!(
            compared_columns(&columns, &["id".to_string()]),
            vec!["email".to_string(), "age".to_string()]
        );
        assert_eq!(compared_columns(&columns, &[]).len(), 3);

        let key_only = vec![col("id", "integer")];
        assert_eq!(compared_columns(&key_only, &["id".to_string()]), vec!["id".to_string()]);
    }

    #[test]
    fn test_rows_in_column_order() {
        let objects = vec![
            json!({"email": "ana@example.com", "id": 1, "age": 28}),
            json!({"id": 2, "email": null}),
        ];
        let columns = vec!["id".to_string(), "email".to_string(), "age".to_string()];
        assert_eq!(
            rows_in_column_order(objects, &columns),
            vec![
                vec![json!(1), json!("ana@example.com"), json!(28)],
                vec![json!(2), json!(null), json!(null)],
            ]
        );
    }

    #[test]
    fn test_optional_metrics_are_omitted() {
        let metrics = ColumnMetrics {
            name: "email".into(),
            data_type: "text".into(),
            nulls: 2,
            unique: 7,
            numeric_stats: None,
            numeric_stats_error: None,
        };
        assert_eq!(
            serde_json::to_value(&metrics).unwrap(),
            json!({"name": "email", "data_type": "text", "nulls": 2, "unique": 7})
        );
    }
}
