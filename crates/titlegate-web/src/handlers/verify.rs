use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;
use std::sync::Arc;

use crate::models::{DEFAULT_LANGUAGE, TitleSubmission};
use crate::state::AppState;

pub async fn verify(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<TitleSubmission>,
) -> impl IntoResponse {
    let language = submission
        .language
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    Json(state.engine.verify(&submission.title, &language).await)
}
