use axum::{extract::State, response::IntoResponse, Json};

use crate::AppState;

pub async fn health_handler<R, M>(State(state): State<AppState<R, M>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "network": state.config.network.name,
        "chain_id": state.config.network.chain_id,
    }))
}
