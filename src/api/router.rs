//! Request routing, independent of the HTTP server.
//!
//! [`Router::handle`] turns a method and request target into an
//! [`ApiResponse`]; the server only copies that onto the wire.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::api::error::ApiError;
use crate::config::ProfileConfig;
use crate::executor::DbError;
use crate::profile::{Profiler, TableRef};

pub const JSON_CONTENT_TYPE: &str = "Content-Type: application/json; charset=utf-8";
pub const TEXT_CONTENT_TYPE: &str = "Content-Type: text/plain; version=0.0.4; charset=utf-8";
pub const NO_STORE: &str = "Cache-Control: no-store, max-age=0";
pub const ALLOW_ANY_ORIGIN: &str = "Access-Control-Allow-Origin: *";
pub const ALLOW_METHODS: &str = "Access-Control-Allow-Methods: GET,OPTIONS";
pub const ALLOW_HEADERS: &str = "Access-Control-Allow-Headers: Content-Type";

pub const MAX_BUCKETS: i32 = 1000;

/// Opens a [`Profiler`] per request.
pub trait ProfilerSource {
    type Profiler: Profiler;

    fn open(&self) -> Result<Self::Profiler, DbError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<&'static str>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![JSON_CONTENT_TYPE, NO_STORE, ALLOW_ANY_ORIGIN],
            body: body.to_string().into_bytes(),
        }
    }

    pub fn error(err: &ApiError) -> Self {
        Self::json(err.status(), &json!({ "error": err.to_string() }))
    }

    pub fn preflight() -> Self {
        Self {
            status: 204,
            headers: vec![ALLOW_ANY_ORIGIN, ALLOW_METHODS, ALLOW_HEADERS],
            body: Vec::new(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            204 => "No Content",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Parsed JSON body.
    pub fn json_body(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Health,
    Tables,
    Summary,
    Histogram,
    Preview,
    #[cfg(feature = "metrics")]
    Metrics,
    Unknown,
}

impl Route {
    fn from_path(path: &str) -> Self {
        let path = path.trim_end_matches('/');
        match path {
            "/api/health" => Route::Health,
            "/api/tables" => Route::Tables,
            "/api/summary" => Route::Summary,
            "/api/histogram" => Route::Histogram,
            "/api/preview" => Route::Preview,
            #[cfg(feature = "metrics")]
            "/metrics" => Route::Metrics,
            _ => Route::Unknown,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Route::Health => "/api/health",
            Route::Tables => "/api/tables",
            Route::Summary => "/api/summary",
            Route::Histogram => "/api/histogram",
            Route::Preview => "/api/preview",
            #[cfg(feature = "metrics")]
            Route::Metrics => "/metrics",
            Route::Unknown => "unknown",
        }
    }
}

/// First value of every query parameter.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        params.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    params
}

pub struct Router<S> {
    source: S,
    profile: ProfileConfig,
}

impl<S: ProfilerSource> Router<S> {
    pub fn new(source: S, profile: ProfileConfig) -> Self {
        Self { source, profile }
    }

    pub fn handle(&self, method: &str, target: &str) -> ApiResponse {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let route = Route::from_path(path);

        let response = match method {
            "OPTIONS" => ApiResponse::preflight(),
            "GET" => self.dispatch(route, &parse_query(query)),
            other => ApiResponse::error(&ApiError::MethodNotAllowed(other.to_string())),
        };

        log::debug!("{method} {path} -> {}", response.status);
        #[cfg(feature = "metrics")]
        crate::metrics::METRICS.record_request(route.label(), response.status);

        response
    }

    fn dispatch(&self, route: Route, params: &HashMap<String, String>) -> ApiResponse {
        let result = match route {
            Route::Health => Ok(health()),
            Route::Tables => self.tables(),
            Route::Summary => self.summary(params),
            Route::Histogram => self.histogram(params),
            Route::Preview => self.preview(params),
            #[cfg(feature = "metrics")]
            Route::Metrics => {
                return ApiResponse {
                    status: 200,
                    headers: vec![TEXT_CONTENT_TYPE, NO_STORE],
                    body: crate::metrics::METRICS.render(),
                }
            }
            Route::Unknown => Err(ApiError::NotFound("Not found".to_string())),
        };

        match result {
            Ok(body) => ApiResponse::json(200, &body),
            Err(err) => {
                if let ApiError::Database(e) = &err {
                    log::error!("{} failed: {e}", route.label());
                }
                ApiResponse::error(&err)
            }
        }
    }

    fn tables(&self) -> Result<Value, ApiError> {
        let tables = self.source.open()?.list_tables()?;
        Ok(json!({ "tables": tables }))
    }

    fn summary(&self, params: &HashMap<String, String>) -> Result<Value, ApiError> {
        let table = table_param(params)?;
        let profiler = self.source.open()?;
        match profiler.summarize(&table)? {
            Some(summary) => Ok(json!(summary)),
            None => Err(table_not_found(&table)),
        }
    }

    fn histogram(&self, params: &HashMap<String, String>) -> Result<Value, ApiError> {
        let table = table_param(params)?;
        let column = crate::profile::sanitize_ident(param(params, "column"))?.to_string();
        let buckets = self.buckets_param(params)?;

        let profiler = self.source.open()?;
        let columns = profiler.columns(&table)?;
        if columns.is_empty() {
            return Err(table_not_found(&table));
        }
        let Some(info) = columns.iter().find(|c| c.name == column) else {
            return Err(ApiError::NotFound(format!("Column {column} not found in {table}")));
        };
        if !info.is_numeric() {
            return Err(ApiError::BadRequest(format!(
                "Column {column} is {}, histograms need a numeric column",
                info.data_type
            )));
        }

        let histogram = profiler.histogram(&table, &column, buckets)?;
        Ok(json!({
            "table": table.to_string(),
            "column": column,
            "buckets": buckets,
            "histogram": histogram,
        }))
    }

    fn preview(&self, params: &HashMap<String, String>) -> Result<Value, ApiError> {
        let table = table_param(params)?;
        let limit = self.limit_param(params)?;

        let profiler = self.source.open()?;
        let columns: Vec<String> = profiler.columns(&table)?.into_iter().map(|c| c.name).collect();
        if columns.is_empty() {
            return Err(table_not_found(&table));
        }
        let rows = profiler.preview(&table, &columns, limit)?;
        Ok(json!({ "columns": columns, "rows": rows }))
    }

    fn buckets_param(&self, params: &HashMap<String, String>) -> Result<i32, ApiError> {
        let Some(raw) = params.get("buckets") else {
            return Ok(self.profile.default_buckets);
        };
        match raw.trim().parse::<i32>() {
            Ok(n) if (1..=MAX_BUCKETS).contains(&n) => Ok(n),
            _ => Err(ApiError::BadRequest(format!(
                "buckets must be an integer between 1 and {MAX_BUCKETS}, got '{raw}'"
            ))),
        }
    }

    fn limit_param(&self, params: &HashMap<String, String>) -> Result<i64, ApiError> {
        let Some(raw) = params.get("limit") else {
            return Ok(self.profile.default_preview_limit.min(self.profile.max_preview_limit));
        };
        match raw.trim().parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n.min(self.profile.max_preview_limit)),
            _ => Err(ApiError::BadRequest(format!(
                "limit must be a non-negative integer, got '{raw}'"
            ))),
        }
    }
}

fn health() -> Value {
    json!({
        "ok": true,
        "ts": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
    })
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> &'a str {
    params.get(name).map(String::as_str).unwrap_or("")
}

fn table_param(params: &HashMap<String, String>) -> Result<TableRef, ApiError> {
    Ok(TableRef::parse(param(params, "table"))?)
}

fn table_not_found(table: &TableRef) -> ApiError {
    ApiError::NotFound(format!("Table {table} not found"))
}
