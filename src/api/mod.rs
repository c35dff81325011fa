//! # API — HTTP Server for the Vynos Mini App
//!
//! Runs the Axum server behind the VK Mini App frontend: login upsert,
//! profile lookup, contact updates, saved addresses, and the operational
//! endpoints (`/healthz`, `/readyz`, `/metrics`).
//!
//! Every JSON endpoint answers with the envelope the frontend expects:
//! `{"success": true, "data": ...}` on success and
//! `{"success": false, "error": "..."}` on failure. Requests with an
//! unsupported method get `405 {"error": "Method not allowed"}` without the
//! handler (or the store) ever being touched.

mod routes_addresses;
mod routes_auth;
mod routes_health;
mod routes_status;
mod routes_users;

use crate::{db, prom_metrics};
use anyhow::Result;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Instrument};

pub struct AppState {
    pub db: db::Database,
    pub prom_metrics: prom_metrics::Metrics,
}

impl AppState {
    pub fn with_db(db: db::Database) -> Arc<Self> {
        Arc::new(AppState {
            db,
            prom_metrics: prom_metrics::Metrics::new(),
        })
    }
}

/// Log a failed storage operation and build the sanitized 500 envelope.
///
/// Driver errors never reach the caller verbatim; the full chain goes to the
/// log, the wire gets a stable message.
pub(super) fn storage_error(op: &str, e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    warn!(error = %e, op, "database operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"success": false, "error": "database error"})),
    )
}

/// Middleware that records HTTP request duration into the Prometheus histogram,
/// generates (or propagates) a request ID for correlation, and wraps the
/// request in a tracing span using `.instrument()` for proper async propagation.
async fn metrics_middleware(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> axum::response::Response {
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let method = req.method().to_string();
    let raw_path = req.uri().path().to_string();
    let norm_path = normalize_path(&raw_path);
    let start = std::time::Instant::now();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %raw_path,
    );
    let response = next.run(req).instrument(span).await;

    let duration = start.elapsed().as_secs_f64();
    state
        .prom_metrics
        .http_request_duration
        .get_or_create(&prom_metrics::HttpLabel {
            method,
            path: norm_path,
        })
        .observe(duration);

    let mut response = response;
    response
        .headers_mut()
        .insert("x-request-id", request_id.parse().unwrap());
    response
}

/// Normalize URL path to collapse numeric id segments into a placeholder,
/// preventing histogram label explosion.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|seg| {
            if !seg.is_empty() && seg.chars().all(|c| c.is_ascii_digit()) {
                ":id".to_string()
            } else {
                seg.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ── Fallbacks ───────────────────────────────────────────────────

/// Known path, wrong method. The router answers before any handler runs,
/// which keeps the "no store access on method mismatch" guarantee.
async fn handler_method_not_allowed() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({"error": "Method not allowed"})),
    )
}

async fn handler_not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({"error": "Not found"})),
    )
}

// ── Router ──────────────────────────────────────────────────────

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes_status::handler_index))
        .route("/api/auth/vk", post(routes_auth::handler_auth_vk))
        .route("/api/users/save", post(routes_users::handler_save_user))
        .route("/api/users/{id}", get(routes_users::handler_get_user))
        .route(
            "/api/users/{id}/phone",
            put(routes_users::handler_update_phone),
        )
        .route(
            "/api/users/{id}/email",
            put(routes_users::handler_update_email),
        )
        .route(
            "/api/users/{id}/addresses",
            get(routes_addresses::handler_list_addresses),
        )
        .route(
            "/api/addresses",
            post(routes_addresses::handler_create_address),
        )
        .route(
            "/api/addresses/{id}",
            delete(routes_addresses::handler_delete_address),
        )
        .route("/healthz", get(routes_health::handler_healthz))
        .route("/readyz", get(routes_health::handler_readyz))
        .route("/metrics", get(routes_health::handler_metrics))
        .method_not_allowed_fallback(handler_method_not_allowed)
        .fallback(handler_not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::new())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .with_state(state)
}

// ── Server ──────────────────────────────────────────────────────

pub async fn run(port: u16, settings: &db::ConnectSettings) -> Result<()> {
    let database = db::Database::connect(settings).await?;
    let state = AppState::with_db(database);
    let app = build_router(state.clone());

    // Background task: refresh pool and user-count gauges
    let pool_max = settings.max_connections as i64;
    let gauge_state = Arc::clone(&state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30));
        loop {
            interval.tick().await;
            let pool_size = gauge_state.db.pool().size() as i64;
            let pool_idle = gauge_state.db.pool().num_idle() as i64;
            gauge_state
                .prom_metrics
                .db_pool_active
                .set(pool_size - pool_idle);
            gauge_state.prom_metrics.db_pool_idle.set(pool_idle);
            gauge_state.prom_metrics.db_pool_max.set(pool_max);

            match gauge_state.db.count_users().await {
                Ok(n) => {
                    gauge_state.prom_metrics.users_total.set(n);
                }
                Err(e) => warn!(error = %e, "failed to refresh user count gauge"),
            }
        }
    });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "vynos api listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("vynos api shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! { _ = ctrl_c => info!("received SIGINT, shutting down"), _ = sigterm.recv() => info!("received SIGTERM, shutting down") }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("received SIGINT, shutting down");
    }
}
