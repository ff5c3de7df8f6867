use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::MintedToken;
use crate::services::{mint::MintDispatcher, payment::PaymentOrchestrator};

#[derive(Debug, Deserialize)]
pub struct MintRequest {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Serialize)]
pub struct MintResponse {
    pub success: bool,
    #[serde(rename = "mintedTokens")]
    pub minted_tokens: Vec<MintedToken>,
}

/// POST /mint
///
/// The full saga, synchronous within this request: resolve the
/// session's wallet, charge the pack price to the treasury, poll the
/// charge to a terminal state, then dispatch the batch mint. Holds the
/// request open for up to the configured poll timeout.
///
/// The saga runs in its own task: a client disconnect drops this
/// handler future but not the charge confirmation, so a paid charge is
/// always observed to its terminal state.
pub async fn mint(
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<MintResponse>> {
    if request.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("Session ID is required".to_string()));
    }

    let saga = tokio::spawn(run_saga(state, request.session_id));
    let minted_tokens = saga.await.map_err(|err| {
        tracing::error!(error = %err, "mint saga task aborted");
        AppError::Internal("mint saga aborted before completion".to_string())
    })??;

    Ok(Json(MintResponse {
        success: true,
        minted_tokens,
    }))
}

async fn run_saga(state: AppState, session_id: String) -> Result<Vec<MintedToken>> {
    let payments = PaymentOrchestrator::new(Arc::clone(&state.platform), &state.config);
    let wallet = payments.resolve_wallet(&session_id).await?;
    let transaction_id = payments.charge_and_confirm(&session_id).await?;
    tracing::info!(
        transaction_id = %transaction_id,
        wallet = %wallet,
        "payment confirmed; dispatching mint"
    );

    MintDispatcher::new(Arc::clone(&state.platform), &state.config)
        .dispatch(&wallet)
        .await
}
