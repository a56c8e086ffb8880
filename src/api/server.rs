//! `may_minihttp` service in front of the [`Router`].

use may_minihttp::{HttpServer, HttpService, Request, Response};
use std::io;
use std::sync::Arc;

use crate::api::router::{ApiResponse, ProfilerSource, Router};
use crate::config::AppConfig;
use crate::connection::connect;
use crate::executor::{DbError, PgExecutor};
use crate::profile::PgProfiler;

/// Connects to PostgreSQL for every request.
#[derive(Debug, Clone)]
pub struct PgProfilerSource {
    url: String,
}

impl PgProfilerSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl ProfilerSource for PgProfilerSource {
    type Profiler = PgProfiler<PgExecutor>;

    fn open(&self) -> Result<Self::Profiler, DbError> {
        let client = connect(&self.url)?;
        Ok(PgProfiler::new(PgExecutor::new(client)))
    }
}

pub struct ApiService<S> {
    router: Arc<Router<S>>,
}

impl<S> Clone for ApiService<S> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
        }
    }
}

impl<S: ProfilerSource> ApiService<S> {
    pub fn new(router: Router<S>) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

impl<S: ProfilerSource> HttpService for ApiService<S> {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let reply = self.router.handle(req.method(), req.path());
        write_reply(reply, res);
        Ok(())
    }
}

fn write_reply(reply: ApiResponse, res: &mut Response) {
    res.status_code(reply.status as usize, reply.reason());
    for header in reply.headers.iter().copied() {
        res.header(header);
    }
    res.body_vec(reply.body);
}

/// Start the API on `host_port`; returns once the listener is bound.
pub fn start<S>(router: Router<S>, host_port: &str) -> io::Result<may::coroutine::JoinHandle<()>>
where
    S: ProfilerSource + Send + Sync + 'static,
{
    let handle = HttpServer(ApiService::new(router)).start(host_port)?;
    log::info!("profiling API listening on http://{host_port}");
    Ok(handle)
}

/// Start the API against the configured database.
pub fn start_from_config(config: &AppConfig) -> anyhow::Result<may::coroutine::JoinHandle<()>> {
    let url = config.database_url()?;
    crate::connection::validate_connection_string(url)?;
    log::info!(
        "profiling {}",
        crate::connection::redact_connection_string(url)
    );
    let router = Router::new(PgProfilerSource::new(url), config.profile.clone());
    Ok(start(router, &config.server.host_port)?)
}
