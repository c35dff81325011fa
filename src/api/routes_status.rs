//! Index page handler.

use axum::http::header;
use axum::response::IntoResponse;

/// Serve the static HTML index describing the API surface. Handy when
/// someone opens the service root in a browser.
pub(super) async fn handler_index() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        include_str!("../index.html"),
    )
}
