//! Process-wide Prometheus metrics.

use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Duration;

pub static METRICS: Lazy<TablelensMetrics> = Lazy::new(TablelensMetrics::init);

pub struct TablelensMetrics {
    registry: Registry,
    pub queries_total: IntCounter,
    pub query_errors_total: IntCounter,
    pub query_duration: Histogram,
    pub http_requests_total: IntCounterVec,
    pub seed_steps_total: IntCounterVec,
}

impl TablelensMetrics {
    pub fn init() -> Self {
        let registry = Registry::new();

        // Names and label sets are static, so construction cannot fail.
        let queries_total = IntCounter::new("tablelens_queries_total", "Total queries executed")
            .expect("valid metric definition");
        let query_errors_total = IntCounter::new("tablelens_query_errors_total", "Queries that returned an error")
            .expect("valid metric definition");
        let query_duration = Histogram::with_opts(HistogramOpts::new(
            "tablelens_query_duration_seconds",
            "Duration of queries",
        ))
        .expect("valid metric definition");
        let http_requests_total = IntCounterVec::new(
            Opts::new("tablelens_http_requests_total", "Profiling API requests"),
            &["route", "status"],
        )
        .expect("valid metric definition");
        let seed_steps_total = IntCounterVec::new(
            Opts::new("tablelens_seed_steps_total", "Seed statements executed"),
            &["step", "outcome"],
        )
        .expect("valid metric definition");

        for collector in [
            Box::new(queries_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(query_errors_total.clone()),
            Box::new(query_duration.clone()),
            Box::new(http_requests_total.clone()),
            Box::new(seed_steps_total.clone()),
        ] {
            if let Err(e) = registry.register(collector) {
                log::warn!("metric registration failed: {e}");
            }
        }

        Self {
            registry,
            queries_total,
            query_errors_total,
            query_duration,
            http_requests_total,
            seed_steps_total,
        }
    }

    pub fn record_query(&self, elapsed: Duration, ok: bool) {
        self.queries_total.inc();
        if !ok {
            self.query_errors_total.inc();
        }
        self.query_duration.observe(elapsed.as_secs_f64());
    }

    pub fn record_request(&self, route: &str, status: u16) {
        self.http_requests_total
            .with_label_values(&[route, status.to_string().as_str()])
            .inc();
    }

    pub fn record_seed_step(&self, step: &str, ok: bool) {
        let outcome = if ok { "ok" } else { "error" };
        self.seed_steps_total.with_label_values(&[step, outcome]).inc();
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            log::warn!("failed to encode metrics: {e}");
        }
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_series() {
        let metrics = TablelensMetrics::init();
        metrics.record_query(Duration::from_millis(3), false);
        metrics.record_request("/api/health", 200);
        metrics.record_seed_step("create_index", true);

        let text = String::from_utf8(metrics.render()).unwrap();
        assert!(text.contains("tablelens_queries_total 1"));
        assert!(text.contains("tablelens_query_errors_total 1"));
        assert!(text.contains("route=\"/api/health\""));
        assert!(text.contains("step=\"create_index\""));
    }
}
