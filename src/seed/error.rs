//! Seed-specific error types

use crate::executor::DbError;
use crate::seed::plan::SeedStep;

/// Seed errors
#[derive(Debug)]
pub enum SeedError {
    /// A literal of the dataset does not parse into its column type
    InvalidLiteral { column: &'static str, value: String, reason: String },
    /// A statement could not be rendered
    Build(String),
    /// A seed statement failed; the remaining steps were not run
    StepFailed { step: SeedStep, source: DbError },
    /// `BEGIN`, `COMMIT` or `ROLLBACK` failed
    Transaction { action: &'static str, source: DbError },
    /// Verification read failed
    Database(DbError),
    /// The seeded table does not have the expected shape or content
    VerificationFailed(Vec<String>),
}

impl std::fmt::Display for SeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedError::InvalidLiteral { column, value, reason } => {
                write!(f, "Invalid literal '{value}' for column {column}: {reason}")
            }
            SeedError::Build(msg) => write!(f, "Failed to build statement: {msg}"),
            SeedError::StepFailed { step, source } => {
                write!(
                    f,
                    "Seed step '{}' failed: {source}\nRemaining steps were not executed.",
                    step.name()
                )
            }
            SeedError::Transaction { action, source } => {
                write!(f, "Transaction {action} failed: {source}")
            }
            SeedError::Database(e) => write!(f, "Database error: {e}"),
            SeedError::VerificationFailed(problems) => {
                write!(f, "Seed verification failed:")?;
                for problem in problems {
                    write!(f, "\n  - {problem}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for SeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SeedError::StepFailed { source, .. } | SeedError::Transaction { source, .. } => Some(source),
            SeedError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DbError> for SeedError {
    fn from(error: DbError) -> Self {
        SeedError::Database(error)
    }
}
