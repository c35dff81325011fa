//! Vynos profile service — VK Mini App login persistence over PostgreSQL.
//!
//! The crate is split the way the binary runs it: [`db`] owns the pool and
//! every SQL statement, [`api`] owns the Axum surface and its middleware,
//! and [`prom_metrics`] owns the Prometheus registry both of them feed.

pub mod api;
pub mod db;
pub mod prom_metrics;
