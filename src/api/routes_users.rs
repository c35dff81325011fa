//! Profile endpoints — lookup by VK id, full-profile save, contact updates.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::{storage_error, AppState};

// ── GET /api/users/{id} ─────────────────────────────────────────

/// Fetch a profile by VK id. A miss is a 404 envelope, never an implicit
/// create.
pub(super) async fn handler_get_user(
    State(state): State<Arc<AppState>>,
    Path(vk_id): Path<i64>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.get_user_by_vk_id(vk_id).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": user})),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"success": false, "error": "User not found"})),
        ),
        Err(e) => storage_error("get_user_by_vk_id", e),
    }
}

// ── POST /api/users/save ────────────────────────────────────────

/// Full-profile save payload. Unlike the login body, the VK id arrives under
/// its storage name and the contact fields are writable.
#[derive(Deserialize)]
pub(super) struct SaveUserPayload {
    vk_id: i64,
    first_name: String,
    last_name: String,
    #[serde(default)]
    photo_100: Option<String>,
    #[serde(default)]
    photo_200: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

/// Upsert the whole profile, contact fields included. Omitted optional
/// fields overwrite with `NULL`; callers send the full picture.
pub(super) async fn handler_save_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveUserPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state
        .db
        .save_user_profile(
            payload.vk_id,
            &payload.first_name,
            &payload.last_name,
            payload.photo_100.as_deref(),
            payload.photo_200.as_deref(),
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await
    {
        Ok(user) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": user})),
        ),
        Err(e) => storage_error("save_user_profile", e),
    }
}

// ── PUT /api/users/{id}/phone ───────────────────────────────────

#[derive(Deserialize)]
pub(super) struct UpdatePhonePayload {
    phone: String,
}

pub(super) async fn handler_update_phone(
    State(state): State<Arc<AppState>>,
    Path(vk_id): Path<i64>,
    Json(payload): Json<UpdatePhonePayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.update_user_phone(vk_id, &payload.phone).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": user})),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"success": false, "error": "User not found"})),
        ),
        Err(e) => storage_error("update_user_phone", e),
    }
}

// ── PUT /api/users/{id}/email ───────────────────────────────────

#[derive(Deserialize)]
pub(super) struct UpdateEmailPayload {
    email: String,
}

pub(super) async fn handler_update_email(
    State(state): State<Arc<AppState>>,
    Path(vk_id): Path<i64>,
    Json(payload): Json<UpdateEmailPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.update_user_email(vk_id, &payload.email).await {
        Ok(Some(user)) => (
            StatusCode::OK,
            Json(serde_json::json!({"success": true, "data": user})),
        ),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"success": false, "error": "User not found"})),
        ),
        Err(e) => storage_error("update_user_email", e),
    }
}
