//! # Prometheus Metrics — Exposition for Container Orchestration
//!
//! Exposes vynos operational metrics in the Prometheus text exposition format
//! for scraping by Prometheus, Grafana Agent, or any OpenMetrics-compatible
//! collector.
//!
//! ## Metrics Exposed
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `vynos_http_request_duration_seconds` | Histogram | `method`, `path` | Request latency by route |
//! | `vynos_logins_total` | Counter | — | VK login upserts served |
//! | `vynos_users_total` | Gauge | — | Registered users |
//! | `vynos_db_pool_active` | Gauge | — | Checked-out pool connections |
//! | `vynos_db_pool_idle` | Gauge | — | Idle pool connections |
//! | `vynos_db_pool_max` | Gauge | — | Configured pool ceiling |
//!
//! ## Integration
//!
//! The request middleware records the histogram per response; the gauges are
//! refreshed by the server's 30-second background loop. The `/metrics`
//! endpoint renders the current registry state on each scrape.

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

/// Label set for the request duration histogram. `path` is the normalized
/// route (numeric segments collapsed), never the raw URL.
#[derive(Clone, Debug, Hash, PartialEq, Eq, prometheus_client::encoding::EncodeLabelSet)]
pub struct HttpLabel {
    pub method: String,
    pub path: String,
}

/// Thread-safe metrics registry for the vynos API.
///
/// All fields use atomic types and are safe to update from any thread or
/// async task. The `Family` type creates per-label-set instances on first use.
pub struct Metrics {
    pub registry: Registry,
    pub http_request_duration: Family<HttpLabel, Histogram>,
    pub logins: Counter,
    pub users_total: Gauge,
    pub db_pool_active: Gauge,
    pub db_pool_idle: Gauge,
    pub db_pool_max: Gauge,
}

impl Metrics {
    /// Create a new metrics registry with all vynos metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        // 1ms to ~8s, which brackets everything from a pool hit to the
        // 30s request timeout tripping.
        let http_request_duration = Family::<HttpLabel, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 14))
        });
        registry.register(
            "vynos_http_request_duration_seconds",
            "HTTP request duration by method and normalized path",
            http_request_duration.clone(),
        );

        let logins = Counter::default();
        registry.register(
            "vynos_logins",
            "VK login upserts served",
            logins.clone(),
        );

        let users_total = Gauge::default();
        registry.register(
            "vynos_users_total",
            "Number of registered users",
            users_total.clone(),
        );

        let db_pool_active = Gauge::default();
        registry.register(
            "vynos_db_pool_active",
            "Checked-out database pool connections",
            db_pool_active.clone(),
        );

        let db_pool_idle = Gauge::default();
        registry.register(
            "vynos_db_pool_idle",
            "Idle database pool connections",
            db_pool_idle.clone(),
        );

        let db_pool_max = Gauge::default();
        registry.register(
            "vynos_db_pool_max",
            "Configured database pool ceiling",
            db_pool_max.clone(),
        );

        Self {
            registry,
            http_request_duration,
            logins,
            users_total,
            db_pool_active,
            db_pool_idle,
            db_pool_max,
        }
    }

    /// Render all metrics in Prometheus text exposition format.
    pub fn encode(&self) -> String {
        let mut buf = String::new();
        encode(&mut buf, &self.registry).expect("encoding metrics should not fail");
        buf
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
