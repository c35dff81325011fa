//! VK login endpoint — the profile upsert behind Mini App sign-in.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::{storage_error, AppState};

/// Login payload, shaped like the object `VKWebAppGetUserInfo` hands the
/// frontend.
///
/// Some client builds still send `access_token`; it is accepted for
/// compatibility and dropped on the floor. Launch-signature verification
/// is the gateway's job, and the token has no consumer here.
#[derive(Deserialize)]
pub(super) struct VkLoginPayload {
    id: i64,
    first_name: String,
    last_name: String,
    #[serde(default)]
    photo_100: Option<String>,
    #[serde(default)]
    photo_200: Option<String>,
    #[serde(default)]
    #[allow(dead_code)]
    access_token: Option<String>,
}

// ── POST /api/auth/vk ───────────────────────────────────────────

/// Upsert the profile for a VK login and return the row as written.
///
/// One statement handles both the first login (insert) and every later one
/// (update of name and avatars). The response always carries the post-write
/// values, including the store-assigned `id` and the refreshed `updated_at`.
pub(super) async fn handler_auth_vk(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VkLoginPayload>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state
        .db
        .upsert_user_on_login(
            payload.id,
            &payload.first_name,
            &payload.last_name,
            payload.photo_100.as_deref(),
            payload.photo_200.as_deref(),
        )
        .await
    {
        Ok(user) => {
            state.prom_metrics.logins.inc();
            (
                StatusCode::OK,
                Json(serde_json::json!({"success": true, "data": user})),
            )
        }
        Err(e) => storage_error("upsert_user_on_login", e),
    }
}
