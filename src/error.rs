use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::TransactionState;

#[derive(Error, Debug)]
pub enum AppError {
    /// Transport failure or GraphQL-level errors from the platform.
    /// `network` distinguishes an unreachable endpoint from a reachable
    /// one that rejected the operation.
    #[error("Platform request failed: {}", messages.join("; "))]
    Remote { messages: Vec<String>, network: bool },

    /// The platform answered but the response is missing fields this
    /// schema version requires. Not retried: the schema has drifted.
    #[error("Unexpected platform response: {0}")]
    UpstreamProtocol(String),

    #[error("Auth session not found: {0}")]
    SessionNotFound(String),

    #[error("No wallet is linked to this session")]
    WalletNotLinked,

    #[error("Charge could not be created: {0}")]
    ChargeInitiation(String),

    #[error("Payment ended in state {state}")]
    PaymentRejected { state: TransactionState },

    #[error("Payment confirmation timed out")]
    PaymentTimeout,

    #[error("Batch mint failed: {0}")]
    MintDispatch(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AppError::Remote { network, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                if network { "REMOTE_NETWORK_ERROR" } else { "REMOTE_ERROR" },
            ),
            AppError::UpstreamProtocol(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_PROTOCOL_ERROR")
            }
            AppError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "SESSION_NOT_FOUND"),
            AppError::WalletNotLinked => (StatusCode::BAD_REQUEST, "WALLET_NOT_LINKED"),
            AppError::ChargeInitiation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CHARGE_INITIATION_FAILED")
            }
            AppError::PaymentRejected { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_REJECTED")
            }
            AppError::PaymentTimeout => (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_TIMEOUT"),
            AppError::MintDispatch(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MINT_DISPATCH_FAILED")
            }
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_error_carries_the_failing_state() {
        let err = AppError::PaymentRejected {
            state: TransactionState::Canceled,
        };
        assert_eq!(err.to_string(), "Payment ended in state CANCELED");
    }

    #[test]
    fn remote_error_joins_all_messages() {
        let err = AppError::Remote {
            messages: vec!["first".to_string(), "second".to_string()],
            network: false,
        };
        assert_eq!(err.to_string(), "Platform request failed: first; second");
    }
}
