//! SQL text of the profiling queries.
//!
//! Identifiers are interpolated already sanitized and quoted; values go
//! through bind parameters. Aggregates are cast to `float8`/`bigint` so rows
//! decode into plain Rust numbers.

use crate::profile::ident::{quote_ident, TableRef};

pub const LIST_TABLES: &str = r#"
    SELECT table_schema::text, table_name::text
    FROM information_schema.tables
    WHERE table_type = 'BASE TABLE'
      AND table_schema NOT IN ('pg_catalog', 'information_schema')
    ORDER BY 1, 2
"#;

/// Params: schema, table.
pub const TABLE_COLUMNS: &str = r#"
    SELECT column_name::text, data_type::text
    FROM information_schema.columns
    WHERE table_schema = $1::text AND table_name = $2::text
    ORDER BY ordinal_position
"#;

/// Params: schema, table.
pub const PRIMARY_KEY_COLUMNS: &str = r#"
    SELECT kcu.column_name::text
    FROM information_schema.table_constraints tc
    JOIN information_schema.key_column_usage kcu
      ON tc.constraint_name = kcu.constraint_name
     AND tc.table_schema = kcu.table_schema
     AND tc.table_name = kcu.table_name
    WHERE tc.constraint_type = 'PRIMARY KEY'
      AND tc.table_schema = $1::text
      AND tc.table_name = $2::text
    ORDER BY kcu.ordinal_position
"#;

/// Total rows and distinct rows over `columns`.
pub fn row_counts(table: &TableRef, columns: &[String]) -> String {
    let list: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    format!(
        "SELECT COUNT(*)::bigint, COUNT(DISTINCT ROW({}))::bigint FROM {}",
        list.join(", "),
        table.quoted()
    )
}

/// NULL count and distinct non-NULL count of one column.
pub fn column_counts(table: &TableRef, column: &str) -> String {
    let c = quote_ident(column);
    format!(
        "SELECT COUNT(*) FILTER (WHERE {c} IS NULL), COUNT(DISTINCT {c}) FROM {}",
        table.quoted()
    )
}

pub fn numeric_stats(table: &TableRef, column: &str) -> String {
    let c = quote_ident(column);
    format!(
        "SELECT
            COUNT({c})::bigint,
            MIN({c})::float8,
            MAX({c})::float8,
            AVG({c})::float8,
            STDDEV_SAMP({c})::float8,
            (PERCENTILE_DISC(0.25) WITHIN GROUP (ORDER BY {c}))::float8,
            (PERCENTILE_DISC(0.5) WITHIN GROUP (ORDER BY {c}))::float8,
            (PERCENTILE_DISC(0.75) WITHIN GROUP (ORDER BY {c}))::float8
        FROM {}
        WHERE {c} IS NOT NULL",
        table.quoted()
    )
}

/// Count, min and max of the non-NULL values.
pub fn histogram_range(table: &TableRef, column: &str) -> String {
    let c = quote_ident(column);
    format!(
        "SELECT COUNT({c})::bigint, MIN({c})::float8, MAX({c})::float8 FROM {} WHERE {c} IS NOT NULL",
        table.quoted()
    )
}

/// Params: min, max, buckets. The maximum value falls in the last bucket.
pub fn histogram_buckets(table: &TableRef, column: &str) -> String {
    let c = quote_ident(column);
    format!(
        "SELECT LEAST(width_bucket({c}::float8, $1::float8, $2::float8, $3::int4), $3::int4) AS bkt, COUNT(*)::bigint
        FROM {}
        WHERE {c} IS NOT NULL
        GROUP BY bkt
        ORDER BY bkt",
        table.quoted()
    )
}

/// Param: limit. One row holding the selected rows as a JSON array.
pub fn preview(table: &TableRef) -> String {
    format!(
        "SELECT COALESCE(json_agg(t), '[]'::json)::text FROM (SELECT * FROM {} LIMIT $1::bigint) t",
        table.quoted()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> TableRef {
        TableRef::parse("customers_demo").unwrap()
    }

    #[test]
    fn test_row_counts_uses_row_constructor() {
        let sql = row_counts(&demo(), &["email".into(), "age".into()]);
        assert_eq!(
            sql,
            "SELECT COUNT(*)::bigint, COUNT(DISTINCT ROW(\"email\", \"age\"))::bigint FROM \"public\".\"customers_demo\""
        );
    }

    #[test]
    fn test_column_counts() {
        let sql = column_counts(&demo(), "email");
        assert!(sql.contains("FILTER (WHERE \"email\" IS NULL)"));
        assert!(sql.contains("COUNT(DISTINCT \"email\")"));
    }

    #[test]
    fn test_numeric_stats_quartiles_are_parenthesized() {
        let sql = numeric_stats(&demo(), "income");
        assert_eq!(sql.matches("WITHIN GROUP (ORDER BY \"income\"))::float8").count(), 3);
        assert!(sql.contains("STDDEV_SAMP(\"income\")::float8"));
        assert!(sql.trim_end().ends_with("WHERE \"income\" IS NOT NULL"));
    }

    #[test]
    fn test_histogram_is_clamped() {
        let sql = histogram_buckets(&demo(), "age");
        assert!(sql.starts_with("SELECT LEAST(width_bucket(\"age\"::float8"));
        assert!(sql.contains("GROUP BY bkt"));
    }

    #[test]
    fn test_preview_binds_limit() {
        assert_eq!(
            preview(&demo()),
            "SELECT COALESCE(json_agg(t), '[]'::json)::text FROM (SELECT * FROM \"public\".\"customers_demo\" LIMIT $1::bigint) t"
        );
    }
}
