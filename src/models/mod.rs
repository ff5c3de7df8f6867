// src/models/mod.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Handle for an in-progress wallet-linking flow, created on the
/// platform and displayed to the end user as a QR code.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationSession {
    pub id: String,
    pub state: String,
    pub qr_payload: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a single resolution check against a session. The address
/// stays `None` until the user completes verification out-of-band.
#[derive(Debug, Clone, Serialize)]
pub struct WalletLink {
    pub session_id: String,
    pub wallet_address: Option<String>,
}

/// Lifecycle state of a platform transaction (charge or mint request).
/// States outside the two terminal sets are treated as still pending;
/// `Other` keeps the poll loop alive when the platform grows new ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionState {
    Pending,
    Broadcast,
    Executed,
    Confirmed,
    Completed,
    Failed,
    Canceled,
    Rejected,
    Expired,
    Other(String),
}

impl TransactionState {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "BROADCAST" => Self::Broadcast,
            "EXECUTED" => Self::Executed,
            "CONFIRMED" => Self::Confirmed,
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "CANCELED" | "CANCELLED" => Self::Canceled,
            "REJECTED" => Self::Rejected,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Broadcast => "BROADCAST",
            Self::Executed => "EXECUTED",
            Self::Confirmed => "CONFIRMED",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
            Self::Canceled => "CANCELED",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal_success(&self) -> bool {
        matches!(self, Self::Executed | Self::Confirmed | Self::Completed)
    }

    pub fn is_terminal_failure(&self) -> bool {
        matches!(
            self,
            Self::Failed | Self::Canceled | Self::Rejected | Self::Expired
        )
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Charge accepted by the platform, identified for follow-up polling.
#[derive(Debug, Clone)]
pub struct ChargeReceipt {
    pub transaction_id: String,
    pub state: TransactionState,
}

/// One (token, amount) entry of a batch mint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintItem {
    pub token_id: u64,
    pub amount: u64,
}

/// Acknowledgement of a submitted batch mint. Settlement happens
/// asynchronously on the platform and is not polled here.
#[derive(Debug, Clone)]
pub struct MintReceipt {
    pub request_id: String,
    pub state: TransactionState,
}

/// Token entry reported back to the client after a successful mint.
#[derive(Debug, Clone, Serialize)]
pub struct MintedToken {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct TokenBalance {
    pub token_id: u64,
    pub balance: u64,
}

#[derive(Debug, Clone)]
pub struct TokenSupply {
    pub token_id: u64,
    pub supply: u64,
}

pub fn token_name(token_id: u64) -> &'static str {
    match token_id {
        1 => "Rock",
        2 => "Paper",
        3 => "Scissors",
        _ => "Unknown",
    }
}
