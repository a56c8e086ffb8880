//! # Tablelens
//!
//! Seeds the `public.customers_demo` demonstration table on PostgreSQL and
//! serves a read-only profiling API (row counts, NULLs, duplicates, numeric
//! statistics, histograms, previews) over the `may` coroutine runtime.
//!
//! The seed is a fixed sequence of five statements, see [`seed::SeedPlan`].

pub mod api;
pub mod config;
pub mod connection;
pub mod executor;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod profile;
pub mod seed;
#[doc(hidden)]
pub mod test_helpers;

pub use config::AppConfig;
pub use connection::{connect, ConnectionError};
pub use executor::{DbError, Executor, PgExecutor};
pub use seed::{run_seed, RunMode, SeedError, SeedPlan, SeedReport};
