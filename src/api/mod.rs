//! Read-only profiling HTTP API.
//!
//! | Route | Parameters |
//! |---|---|
//! | `GET /api/health` | |
//! | `GET /api/tables` | |
//! | `GET /api/summary` | `table=[schema.]name` |
//! | `GET /api/histogram` | `table`, `column`, `buckets` (default 20) |
//! | `GET /api/preview` | `table`, `limit` (default 10) |
//! | `GET /metrics` | feature `metrics` |
//!
//! Every JSON reply carries `Cache-Control: no-store` and
//! `Access-Control-Allow-Origin: *`; failures are `{"error": "..."}`.

pub mod error;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::{ApiResponse, ProfilerSource, Router};
pub use server::{start, start_from_config, ApiService, PgProfilerSource};
