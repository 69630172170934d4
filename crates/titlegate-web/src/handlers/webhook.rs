use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::models::RegistrySyncPayload;
use crate::state::AppState;

/// Callback from the official registry: record the decision on the stored
/// application row.
pub async fn registry_sync(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegistrySyncPayload>,
) -> impl IntoResponse {
    match state
        .engine
        .sync_registration(
            &payload.title,
            &payload.status,
            &payload.government_registration_id,
        )
        .await
    {
        Ok(()) => Json(serde_json::json!({
            "status": "success",
            "message": "Store synced with official registry records.",
        }))
        .into_response(),
        Err(err) => {
            tracing::error!(title = %payload.title, error = %err, "registry sync failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "detail": format!("Sync failed: {err}") })),
            )
                .into_response()
        }
    }
}
