use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::constants::TOKEN_IDS;
use crate::error::{AppError, Result};

#[derive(Serialize)]
pub struct SupplyResponse {
    pub remaining: u64,
}

/// GET /balances/{wallet}
///
/// Catalog balances for one wallet, keyed by token id. Ids outside the
/// catalog are dropped even if the platform reports them.
pub async fn balances(
    State(state): State<AppState>,
    Path(wallet): Path<String>,
) -> Result<Json<BTreeMap<String, u64>>> {
    if wallet.trim().is_empty() {
        return Err(AppError::BadRequest("Wallet address required".to_string()));
    }

    let entries = state
        .platform
        .get_token_balances(&wallet, state.config.collection_id, &TOKEN_IDS)
        .await?;

    let mut balances = BTreeMap::new();
    for entry in entries {
        balances.insert(entry.token_id.to_string(), entry.balance);
    }
    Ok(Json(balances))
}

/// GET /supply
///
/// Packs still mintable: per-token cap times the catalog size, minus
/// everything minted so far, floored at zero.
pub async fn supply(State(state): State<AppState>) -> Result<Json<SupplyResponse>> {
    let supplies = state
        .platform
        .get_collection_supply(state.config.collection_id, &TOKEN_IDS)
        .await?;

    let minted: u64 = supplies.iter().map(|s| s.supply).sum();
    let cap = state.config.max_supply_per_token * TOKEN_IDS.len() as u64;
    Ok(Json(SupplyResponse {
        remaining: cap.saturating_sub(minted),
    }))
}
