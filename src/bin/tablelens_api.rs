//! Profiling API server.
//!
//! Reads `config/config.toml`, `TABLELENS__*` and `DATABASE_URL`, then serves
//! the routes of `tablelens::api` until the process is stopped.

use tablelens::{api, AppConfig};
use tracing_subscriber::EnvFilter;

/// Coroutine stack in words; request handling decodes rows and JSON on it.
const COROUTINE_STACK_SIZE: usize = 0x10000;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    may::config().set_stack_size(COROUTINE_STACK_SIZE);

    let server = api::start_from_config(&config)?;
    println!("Profiling API running at http://{}/api/health", config.server.host_port);
    server
        .join()
        .map_err(|e| anyhow::anyhow!("Server encountered an error: {:?}", e))?;
    Ok(())
}
