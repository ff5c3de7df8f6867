use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use super::AppState;
use crate::error::{AppError, Result};
use crate::services::session::SessionService;

#[derive(Serialize)]
pub struct StartAuthResponse {
    pub id: String,
    pub state: String,
    #[serde(rename = "qrPayload")]
    pub qr_payload: String,
}

#[derive(Serialize)]
pub struct CheckAuthResponse {
    pub address: Option<String>,
}

/// GET /start-auth
pub async fn start_auth(State(state): State<AppState>) -> Result<Json<StartAuthResponse>> {
    let session = SessionService::new(Arc::clone(&state.platform))
        .start()
        .await?;
    Ok(Json(StartAuthResponse {
        id: session.id,
        state: session.state,
        qr_payload: session.qr_payload,
    }))
}

/// GET /check-auth/{session_id}
///
/// Polled by the client (every 3 s, 120 s budget on its side). Always
/// 200 with a null address while unresolved or on a transient upstream
/// failure; only an unknown session escalates to 404.
pub async fn check_auth(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CheckAuthResponse>> {
    if session_id.trim().is_empty() {
        return Err(AppError::BadRequest("Auth session ID is required".to_string()));
    }

    let link = SessionService::new(Arc::clone(&state.platform))
        .check(&session_id)
        .await?;
    Ok(Json(CheckAuthResponse {
        address: link.wallet_address,
    }))
}
