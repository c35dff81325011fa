//! Saved address endpoints — list, create, delete.
//!
//! These routes key on the surrogate `users.id` that profile responses
//! return as `data.id`, not on `vk_id`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::{storage_error, AppState};

// ── GET /api/users/{id}/addresses ───────────────────────────────

/// List a user's addresses, newest first. An unknown user id just yields an
/// empty list, matching the lookup-by-owner semantics of the table.
pub(super) async fn handler_list_addresses(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.get_user_addresses(user_id).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": rows})),
        ),
        Err(e) => storage_error("get_user_addresses", e),
    }
}

// ── POST /api/addresses ─────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct CreateAddressPayload {
    user_id: i64,
    title: String,
    address_text: String,
}

pub(super) async fn handler_create_address(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateAddressPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"success": false, "error": "title must not be empty"})),
        );
    }
    if payload.address_text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"success": false, "error": "address_text must not be empty"})),
        );
    }

    match state
        .db
        .create_address(payload.user_id, &payload.title, &payload.address_text)
        .await
    {
        Ok(row) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": row})),
        ),
        Err(e) => {
            // A dangling user_id is the caller's mistake, not a server fault
            let msg = e.to_string();
            if msg.contains("foreign key") {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"success": false, "error": "Unknown user_id"})),
                )
            } else {
                storage_error("create_address", e)
            }
        }
    }
}

// ── DELETE /api/addresses/{id} ──────────────────────────────────

pub(super) async fn handler_delete_address(
    State(state): State<Arc<AppState>>,
    Path(address_id): Path<i64>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.delete_address(address_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "message": "Address deleted successfully"})),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"success": false, "error": "Address not found"})),
        ),
        Err(e) => storage_error("delete_address", e),
    }
}
