//! Helpers for integration tests that need a live PostgreSQL.
//!
//! Tests read `TEST_DATABASE_URL`; when it is unset they skip instead of
//! failing, so `cargo test` works on machines without a database.

use crate::connection::connect;
use crate::executor::{DbError, PgExecutor};

pub const TEST_DATABASE_URL: &str = "TEST_DATABASE_URL";

pub struct TestDatabase {
    url: String,
}

impl TestDatabase {
    /// `None` (with a note on stderr) when `TEST_DATABASE_URL` is not set.
    pub fn from_env() -> Option<Self> {
        match std::env::var(TEST_DATABASE_URL) {
            Ok(url) if !url.is_empty() => Some(Self { url }),
            _ => {
                eprintln!("{TEST_DATABASE_URL} not set, skipping database test");
                None
            }
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// A fresh connection wrapped in an executor.
    pub fn executor(&self) -> Result<PgExecutor, DbError> {
        Ok(PgExecutor::new(connect(&self.url)?))
    }
}
