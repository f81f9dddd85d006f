//! # API Module
//!
//! HTTP endpoints exposing the balance adapter and the assistant.
//!
//! ## Available Endpoints
//! - `GET /api/health` - Liveness and selected network
//! - `GET /api/balance/:contract/:wallet` - ERC20 balance report
//! - `POST /api/chat` - Send a message to the assistant

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{agent::LanguageModel, blockchain::ChainReader, AppState};

pub mod balance;
pub mod chat;
pub mod health;

pub fn create_router<R, M>(state: AppState<R, M>) -> Router
where
    R: ChainReader + 'static,
    M: LanguageModel + 'static,
{
    let api_router = Router::new()
        .route("/health", get(health::health_handler::<R, M>))
        .route("/balance/:contract/:wallet", get(balance::get_balance_handler::<R, M>))
        .route("/chat", post(chat::chat_handler::<R, M>));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
