use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use std::sync::Arc;

use titlegate_core::EngineError;

use crate::models::OfficialApplication;
use crate::state::AppState;

pub async fn submit_application(
    State(state): State<Arc<AppState>>,
    Json(application): Json<OfficialApplication>,
) -> impl IntoResponse {
    match state
        .engine
        .submit_application(&application.title, &application.language)
        .await
    {
        Ok(()) => {
            tracing::info!(
                title = %application.title,
                owner = %application.owner_email,
                "official application submitted"
            );
            Json(serde_json::json!({
                "status": "success",
                "message": "Official application submitted for registration.",
            }))
            .into_response()
        }
        Err(err) => {
            let status = match &err {
                EngineError::EmptyTitle => StatusCode::BAD_REQUEST,
                EngineError::DuplicateTitle => StatusCode::CONFLICT,
                EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            };
            if status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(title = %application.title, error = %err, "application persistence failed");
            }
            (status, Json(serde_json::json!({ "detail": err.to_string() }))).into_response()
        }
    }
}
