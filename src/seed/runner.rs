//! Executes a [`SeedPlan`] statement by statement.

use std::time::{Duration, Instant};

use crate::executor::Executor;
use crate::seed::error::SeedError;
use crate::seed::plan::{SeedPlan, SeedStep};
use crate::seed::schema;

/// How statements are committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Each statement commits on its own; a failure leaves earlier steps applied.
    #[default]
    Autocommit,
    /// `BEGIN` before the first step, `COMMIT` after the last, `ROLLBACK` on failure.
    Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: SeedStep,
    pub rows_affected: u64,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Default)]
pub struct SeedReport {
    pub outcomes: Vec<StepOutcome>,
}

impl SeedReport {
    /// Rows reported by the INSERT step.
    pub fn rows_inserted(&self) -> u64 {
        self.outcomes
            .iter()
            .filter(|o| o.step == SeedStep::InsertRows)
            .map(|o| o.rows_affected)
            .sum()
    }

    pub fn total_elapsed(&self) -> Duration {
        self.outcomes.iter().map(|o| o.elapsed).sum()
    }

    pub fn summary(&self) -> String {
        format!(
            "Seed OK -> {}.{} created ({} rows, {} statements, {:?})",
            schema::SCHEMA,
            schema::TABLE,
            self.rows_inserted(),
            self.outcomes.len(),
            self.total_elapsed()
        )
    }
}

/// Run every statement of `plan` in order, stopping at the first failure.
///
/// Nothing is retried. In [`RunMode::Autocommit`] the steps that succeeded
/// before a failure stay applied.
pub fn run_seed(executor: &dyn Executor, plan: &SeedPlan, mode: RunMode) -> Result<SeedReport, SeedError> {
    if mode == RunMode::Transaction {
        transaction_control(executor, "BEGIN")?;
    }

    match run_steps(executor, plan) {
        Ok(report) => {
            if mode == RunMode::Transaction {
                transaction_control(executor, "COMMIT")?;
            }
            log::info!("{}", report.summary());
            Ok(report)
        }
        Err(err) => {
            if mode == RunMode::Transaction {
                if let Err(rollback_err) = transaction_control(executor, "ROLLBACK") {
                    log::error!("{rollback_err}");
                }
            }
            Err(err)
        }
    }
}

fn run_steps(executor: &dyn Executor, plan: &SeedPlan) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    for statement in plan.statements() {
        let step = statement.step;
        log::debug!("seed step {step}: {}", statement.sql);

        let start = Instant::now();
        let result = executor.execute(&statement.sql, &[]);
        let elapsed = start.elapsed();

        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_seed_step(step.name(), result.is_ok());

        match result {
            Ok(rows_affected) => {
                log::info!("seed step {step} done ({rows_affected} rows, {elapsed:?})");
                report.outcomes.push(StepOutcome {
                    step,
                    rows_affected,
                    elapsed,
                });
            }
            Err(source) => {
                log::error!("seed step {step} failed after {elapsed:?}: {source}");
                return Err(SeedError::StepFailed { step, source });
            }
        }
    }

    Ok(report)
}

fn transaction_control(executor: &dyn Executor, action: &'static str) -> Result<(), SeedError> {
    executor
        .execute(action, &[])
        .map(|_| ())
        .map_err(|source| SeedError::Transaction { action, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::DbError;
    use may_postgres::types::ToSql;
    use may_postgres::Row;
    use std::cell::RefCell;

    /// Records statements and fails on the first one containing `fail_on`.
    struct ScriptedExecutor {
        log: RefCell<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    impl ScriptedExecutor {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                log: RefCell::new(Vec::new()),
                fail_on,
            }
        }

        fn statements(&self) -> Vec<String> {
            self.log.borrow().clone()
        }
    }

    impl Executor for ScriptedExecutor {
        fn execute(&self, query: &str, _params: &[&dyn ToSql]) -> Result<u64, DbError> {
            self.log.borrow_mut().push(query.to_string());
            if let Some(needle) = self.fail_on {
                if query.contains(needle) {
                    return Err(DbError::QueryError(format!("refused: {needle}")));
                }
            }
            Ok(if query.starts_with("INSERT") { 10 } else { 0 })
        }

        fn query_one(&self, _query: &str, _params: &[&dyn ToSql]) -> Result<Row, DbError> {
            Err(DbError::Other("not scripted".into()))
        }

        fn query_all(&self, _query: &str, _params: &[&dyn ToSql]) -> Result<Vec<Row>, DbError> {
            Err(DbError::Other("not scripted".into()))
        }
    }

    #[test]
    fn test_runs_all_steps_in_order() {
        let plan = SeedPlan::customers_demo().unwrap();
        let executor = ScriptedExecutor::new(None);

        let report = run_seed(&executor, &plan, RunMode::Autocommit).unwrap();

        let executed = executor.statements();
        let planned: Vec<String> = plan.statements().iter().map(|s| s.sql.clone()).collect();
        assert_eq!(executed, planned);
        assert_eq!(report.outcomes.len(), 5);
        assert_eq!(report.rows_inserted(), 10);
        assert!(report.summary().starts_with("Seed OK -> public.customers_demo created (10 rows"));
    }

    #[test]
    fn test_failure_stops_the_sequence() {
        let plan = SeedPlan::customers_demo().unwrap();
        let executor = ScriptedExecutor::new(Some("INSERT INTO"));

        let err = run_seed(&executor, &plan, RunMode::Autocommit).unwrap_err();

        assert!(matches!(err, SeedError::StepFailed { step: SeedStep::InsertRows, .. }));
        let executed = executor.statements();
        assert_eq!(executed.len(), 4, "no statement after the failing one, no retry");
        assert!(!executed.iter().any(|s| s.starts_with("CREATE INDEX")));
    }

    #[test]
    fn test_transaction_mode_wraps_and_rolls_back() {
        let plan = SeedPlan::customers_demo().unwrap();

        let ok = ScriptedExecutor::new(None);
        run_seed(&ok, &plan, RunMode::Transaction).unwrap();
        let executed = ok.statements();
        assert_eq!(executed.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(executed.last().map(String::as_str), Some("COMMIT"));
        assert_eq!(executed.len(), 7);

        let failing = ScriptedExecutor::new(Some("CREATE INDEX"));
        let err = run_seed(&failing, &plan, RunMode::Transaction).unwrap_err();
        assert!(matches!(err, SeedError::StepFailed { step: SeedStep::CreateIndex, .. }));
        assert_eq!(failing.statements().last().map(String::as_str), Some("ROLLBACK"));
    }

    #[test]
    fn test_begin_failure_runs_nothing() {
        let plan = SeedPlan::customers_demo().unwrap();
        let executor = ScriptedExecutor::new(Some("BEGIN"));
        let err = run_seed(&executor, &plan, RunMode::Transaction).unwrap_err();
        assert!(matches!(err, SeedError::Transaction { action: "BEGIN", .. }));
        assert_eq!(executor.statements(), vec!["BEGIN".to_string()]);
    }
}
