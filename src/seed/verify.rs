//! Checks a seeded database against the literal dataset.

use std::collections::BTreeMap;

use crate::executor::{get, DbError, Executor};
use crate::seed::dataset::{customers, DatasetProfile};
use crate::seed::error::SeedError;
use crate::seed::schema::{qualified_table, DATA_COLUMNS, INDEX_NAME, SCHEMA, TABLE};

/// What the live table looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedVerification {
    pub total_rows: i64,
    pub distinct_ids: i64,
    pub null_counts: BTreeMap<String, i64>,
    pub duplicate_groups: Vec<(String, i64)>,
    /// Key columns of the composite index, empty when it is missing.
    pub index_columns: Vec<String>,
}

fn counts_sql() -> String {
    format!(
        "SELECT COUNT(*), COUNT(DISTINCT \"id\") FROM {}",
        qualified_table()
    )
}

fn null_counts_sql() -> String {
    let filters: Vec<String> = DATA_COLUMNS
        .iter()
        .map(|c| format!("COUNT(*) FILTER (WHERE \"{c}\" IS NULL)"))
        .collect();
    format!("SELECT {} FROM {}", filters.join(", "), qualified_table())
}

fn duplicate_groups_sql() -> String {
    let columns: Vec<String> = DATA_COLUMNS.iter().map(|c| format!("\"{c}\"")).collect();
    format!(
        "SELECT concat_ws(' ', COALESCE(\"first_name\", '?'), COALESCE(\"last_name\", '?')), COUNT(*) \
         FROM {} GROUP BY {} HAVING COUNT(*) > 1 ORDER BY MIN(\"id\")",
        qualified_table(),
        columns.join(", ")
    )
}

const INDEX_COLUMNS_SQL: &str = r#"
    SELECT a.attname::text
    FROM pg_index i
    JOIN pg_class ic ON ic.oid = i.indexrelid
    JOIN pg_class tc ON tc.oid = i.indrelid
    JOIN pg_namespace n ON n.oid = tc.relnamespace
    CROSS JOIN LATERAL unnest(i.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
    JOIN pg_attribute a ON a.attrelid = i.indrelid AND a.attnum = k.attnum
    WHERE n.nspname = $1::text AND tc.relname = $2::text AND ic.relname = $3::text
    ORDER BY k.ord
"#;

/// Read the verification facts from the live table.
pub fn verify_seed(executor: &dyn Executor) -> Result<SeedVerification, DbError> {
    let row = executor.query_one(&counts_sql(), &[])?;
    let total_rows: i64 = get(&row, 0)?;
    let distinct_ids: i64 = get(&row, 1)?;

    let row = executor.query_one(&null_counts_sql(), &[])?;
    let mut null_counts = BTreeMap::new();
    for (idx, column) in DATA_COLUMNS.iter().enumerate() {
        null_counts.insert(column.to_string(), get::<i64>(&row, idx)?);
    }

    let duplicate_groups = executor
        .query_all(&duplicate_groups_sql(), &[])?
        .iter()
        .map(|row| Ok((get::<String>(row, 0)?, get::<i64>(row, 1)?)))
        .collect::<Result<Vec<_>, DbError>>()?;

    let index_columns = executor
        .query_all(INDEX_COLUMNS_SQL, &[&SCHEMA, &TABLE, &INDEX_NAME])?
        .iter()
        .map(|row| get::<String>(row, 0))
        .collect::<Result<Vec<_>, DbError>>()?;

    Ok(SeedVerification {
        total_rows,
        distinct_ids,
        null_counts,
        duplicate_groups,
        index_columns,
    })
}

impl SeedVerification {
    /// Every mismatch against `expected`; empty when the table is as seeded.
    pub fn problems(&self, expected: &DatasetProfile) -> Vec<String> {
        let mut problems = Vec::new();

        if self.total_rows != expected.total_rows as i64 {
            problems.push(format!(
                "expected {} rows, found {}",
                expected.total_rows, self.total_rows
            ));
        }
        if self.distinct_ids != self.total_rows {
            problems.push(format!(
                "id is not unique: {} distinct ids for {} rows",
                self.distinct_ids, self.total_rows
            ));
        }
        for (column, want) in &expected.null_counts {
            let found = self.null_counts.get(*column).copied().unwrap_or(-1);
            if found != *want as i64 {
                problems.push(format!("expected {want} NULL {column} values, found {found}"));
            }
        }

        let found_groups: Vec<(String, usize)> = self
            .duplicate_groups
            .iter()
            .map(|(name, count)| (name.clone(), *count as usize))
            .collect();
        if found_groups != expected.duplicate_groups {
            problems.push(format!(
                "expected duplicate groups {:?}, found {:?}",
                expected.duplicate_groups, found_groups
            ));
        }

        if self.index_columns.is_empty() {
            problems.push(format!("index {INDEX_NAME} is missing"));
        } else if self.index_columns != DATA_COLUMNS {
            problems.push(format!(
                "index {INDEX_NAME} covers {:?}, expected {:?}",
                self.index_columns, DATA_COLUMNS
            ));
        }

        problems
    }
}

/// Verify the live table against the literal rows, as one error listing every mismatch.
pub fn check_seeded(executor: &dyn Executor) -> Result<SeedVerification, SeedError> {
    let expected = DatasetProfile::from_rows(&customers()?);
    let found = verify_seed(executor)?;
    let problems = found.problems(&expected);
    if problems.is_empty() {
        log::info!(
            "{SCHEMA}.{TABLE} verified: {} rows, {} duplicate group(s)",
            found.total_rows,
            found.duplicate_groups.len()
        );
        Ok(found)
    } else {
        Err(SeedError::VerificationFailed(problems))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_seeded() -> SeedVerification {
        SeedVerification {
            total_rows: 10,
            distinct_ids: 10,
            null_counts: DATA_COLUMNS
                .iter()
                .map(|c| {
                    let n = match *c {
                        "email" | "income" => 2,
                        _ => 1,
                    };
                    (c.to_string(), n)
                })
                .collect(),
            duplicate_groups: vec![("Ana López".to_string(), 2)],
            index_columns: DATA_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn expected() -> DatasetProfile {
        DatasetProfile::from_rows(&customers().unwrap())
    }

    #[test]
    fn test_matching_table_has_no_problems() {
        assert!(as_seeded().problems(&expected()).is_empty());
    }

    #[test]
    fn test_reports_each_mismatch() {
        let mut found = as_seeded();
        found.total_rows = 20;
        found.null_counts.insert("age".into(), 2);
        found.duplicate_groups.clear();
        found.index_columns.reverse();

        let problems = found.problems(&expected());
        assert_eq!(problems.len(), 5, "{problems:?}");
        assert!(problems[0].contains("expected 10 rows, found 20"));
        assert!(problems.iter().any(|p| p.contains("id is not unique")));
        assert!(problems.iter().any(|p| p.contains("NULL age")));
        assert!(problems.iter().any(|p| p.contains("duplicate groups")));
        assert!(problems.iter().any(|p| p.contains("covers")));
    }

    #[test]
    fn test_missing_index() {
        let mut found = as_seeded();
        found.index_columns.clear();
        assert_eq!(
            found.problems(&expected()),
            vec![format!("index {INDEX_NAME} is missing")]
        );
    }

    #[test]
    fn test_queries_reference_every_data_column() {
        let nulls = null_counts_sql();
        let groups = duplicate_groups_sql();
        for column in DATA_COLUMNS {
            assert!(nulls.contains(&format!("\"{column}\" IS NULL")));
            assert!(groups.contains(&format!("\"{column}\"")));
        }
        assert!(!groups.contains("GROUP BY \"id\""));
    }
}
