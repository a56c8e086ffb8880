//! The ordered statements of the seed.

use std::fmt;

use crate::seed::dataset::{customers, Customer};
use crate::seed::error::SeedError;
use crate::seed::schema;

/// One statement of the seed, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeedStep {
    EnsureSchema,
    DropTable,
    CreateTable,
    InsertRows,
    CreateIndex,
}

impl SeedStep {
    pub const ALL: [SeedStep; 5] = [
        SeedStep::EnsureSchema,
        SeedStep::DropTable,
        SeedStep::CreateTable,
        SeedStep::InsertRows,
        SeedStep::CreateIndex,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SeedStep::EnsureSchema => "ensure_schema",
            SeedStep::DropTable => "drop_table",
            SeedStep::CreateTable => "create_table",
            SeedStep::InsertRows => "insert_rows",
            SeedStep::CreateIndex => "create_index",
        }
    }
}

impl fmt::Display for SeedStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStatement {
    pub step: SeedStep,
    pub sql: String,
}

/// The full seed as rendered SQL.
///
/// ```
/// use tablelens::SeedPlan;
///
/// let plan = SeedPlan::customers_demo()?;
/// assert_eq!(plan.statements().len(), 5);
/// print!("{}", plan.render_script());
/// # Ok::<(), tablelens::SeedError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SeedPlan {
    statements: Vec<PlannedStatement>,
    row_count: usize,
}

impl SeedPlan {
    /// The `customers_demo` seed with its ten literal rows.
    pub fn customers_demo() -> Result<Self, SeedError> {
        Self::with_rows(&customers()?)
    }

    /// Same statements with a different set of rows.
    pub fn with_rows(rows: &[Customer]) -> Result<Self, SeedError> {
        let statements = SeedStep::ALL
            .iter()
            .map(|step| {
                let sql = match step {
                    SeedStep::EnsureSchema => schema::create_schema_sql(),
                    SeedStep::DropTable => schema::drop_table_sql(),
                    SeedStep::CreateTable => schema::create_table_sql(),
                    SeedStep::InsertRows => schema::insert_rows_sql(rows)?,
                    SeedStep::CreateIndex => schema::create_index_sql(),
                };
                Ok(PlannedStatement { step: *step, sql })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        Ok(Self {
            statements,
            row_count: rows.len(),
        })
    }

    pub fn statements(&self) -> &[PlannedStatement] {
        &self.statements
    }

    /// Rows the INSERT statement carries.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// The plan as a script any PostgreSQL client can run.
    pub fn render_script(&self) -> String {
        let mut script = format!(
            "-- Seed for {}: {} rows, one intentional duplicate.\n",
            schema::qualified_table(),
            self.row_count
        );
        for statement in &self.statements {
            script.push_str(&statement.sql);
            script.push_str(";\n");
        }
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_in_fixed_order() {
        let plan = SeedPlan::customers_demo().unwrap();
        let steps: Vec<SeedStep> = plan.statements().iter().map(|s| s.step).collect();
        assert_eq!(steps, SeedStep::ALL.to_vec());
        assert_eq!(plan.row_count(), 10);
    }

    #[test]
    fn test_render_script_terminates_each_statement() {
        let plan = SeedPlan::customers_demo().unwrap();
        let script = plan.render_script();
        assert!(script.starts_with("-- Seed for \"public\".\"customers_demo\": 10 rows"));
        assert_eq!(script.matches(";\n").count(), 5);

        let schema_at = script.find("CREATE SCHEMA").unwrap();
        let drop_at = script.find("DROP TABLE").unwrap();
        let create_at = script.find("CREATE TABLE").unwrap();
        let insert_at = script.find("INSERT INTO").unwrap();
        let index_at = script.find("CREATE INDEX").unwrap();
        assert!(schema_at < drop_at && drop_at < create_at);
        assert!(create_at < insert_at && insert_at < index_at);
    }

    #[test]
    fn test_step_names() {
        let names: Vec<&str> = SeedStep::ALL.iter().map(SeedStep::name).collect();
        assert_eq!(
            names,
            ["ensure_schema", "drop_table", "create_table", "insert_rows", "create_index"]
        );
        assert_eq!(SeedStep::InsertRows.to_string(), "insert_rows");
    }

    #[test]
    fn test_empty_row_set_cannot_be_planned() {
        assert!(SeedPlan::with_rows(&[]).is_err());
    }
}
