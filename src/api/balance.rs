use crate::{
    agent::LanguageModel,
    blockchain::{models::BalanceError, ChainReader},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

// Defines the structure for the contract and wallet extracted from the URL path.
#[derive(Debug, Deserialize)]
pub struct BalancePath {
    pub contract: String,
    pub wallet: String,
}

#[derive(Debug, Serialize)]
pub struct TokenOutput {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: String,
}

// Defines the structure for the JSON output returned by our API.
#[derive(Debug, Serialize)]
pub struct BalanceOutput {
    pub chain_id: u64,
    pub network: String,
    pub contract: String,
    pub wallet: String,
    pub token: TokenOutput,
    pub raw_balance: String,
    pub formatted_balance: String,
    pub checked_at: chrono::DateTime<chrono::Utc>,
    pub report: String,
}

// The handler function for the GET /balance/:contract/:wallet endpoint.
pub async fn get_balance_handler<R, M>(
    Path(path): Path<BalancePath>,
    State(state): State<AppState<R, M>>,
) -> impl IntoResponse
where
    R: ChainReader,
    M: LanguageModel,
{
    let network = &state.config.network;
    match state.adapter.build_report(&path.contract, &path.wallet).await {
        Ok(report) => {
            let output = BalanceOutput {
                chain_id: network.chain_id,
                network: network.name.clone(),
                contract: report.contract.clone(),
                wallet: report.wallet.clone(),
                token: TokenOutput {
                    name: report.token.name.clone(),
                    symbol: report.token.symbol.clone(),
                    decimals: report.token.decimals,
                    total_supply: report.token.total_supply_amount().to_string(),
                },
                raw_balance: report.raw_balance.to_string(),
                formatted_balance: report.formatted_balance.to_string(),
                checked_at: report.checked_at,
                report: report.render(network, state.config.display_decimals),
            };
            (StatusCode::OK, Json(output)).into_response()
        }
        Err(e) => {
            let status = match e {
                BalanceError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                BalanceError::TokenRead { .. } | BalanceError::BalanceRead(_) => {
                    error!("Failed to check balance of {} on {}: {}", path.wallet, path.contract, e);
                    StatusCode::BAD_GATEWAY
                }
            };
            (status, Json(json!({ "error": e.to_string(), "message": e.user_message() }))).into_response()
        }
    }
}
