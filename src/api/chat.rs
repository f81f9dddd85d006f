use crate::{agent::LanguageModel, AppState};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// Client-chosen conversation id. Requests without one get no history.
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Each `session` has its own memory window, separate from the terminal
/// conversation and from other HTTP clients.
pub async fn chat_handler<R, M>(
    State(state): State<AppState<R, M>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse
where
    M: LanguageModel,
{
    if req.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "message must not be empty" })))
            .into_response();
    }
    match state.agent.prompt_session(req.session.as_deref(), req.message.trim()).await {
        Ok(reply) => (StatusCode::OK, Json(ChatResponse { reply })).into_response(),
        Err(e) => (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))).into_response(),
    }
}
