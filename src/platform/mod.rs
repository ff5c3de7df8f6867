// src/platform/mod.rs

pub mod auth_session;
pub mod client;
pub mod legacy;

#[cfg(test)]
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    ChargeReceipt, MintItem, MintReceipt, TokenBalance, TokenSupply, TransactionState,
    VerificationSession,
};

pub use client::GraphqlClient;

/// Capability interface over the platform's GraphQL schema. The field
/// names vary across deployed schema versions, so each confirmed
/// version gets its own adapter and the active one is picked from
/// configuration.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Begin an out-of-band wallet verification flow.
    async fn create_verification_session(&self) -> Result<VerificationSession>;

    /// Wallet currently linked to the session, if any.
    async fn get_wallet_for_session(&self, session_id: &str) -> Result<Option<String>>;

    /// Ask the platform to charge `amount_minor_units` to the treasury.
    async fn create_charge(
        &self,
        recipient: &str,
        amount_minor_units: u128,
        session_ref: &str,
    ) -> Result<ChargeReceipt>;

    async fn get_transaction_state(&self, transaction_id: &str) -> Result<TransactionState>;

    /// Submit one batch mint naming `recipient` for every item.
    async fn batch_mint(
        &self,
        collection_id: u64,
        recipient: &str,
        items: &[MintItem],
    ) -> Result<MintReceipt>;

    async fn get_token_balances(
        &self,
        wallet: &str,
        collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenBalance>>;

    async fn get_collection_supply(
        &self,
        collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenSupply>>;
}

pub fn from_config(config: &Config) -> anyhow::Result<Arc<dyn PlatformApi>> {
    let client = GraphqlClient::new(&config.platform_url, config.platform_token.clone())?;
    match config.platform_schema.as_str() {
        "auth-session" => Ok(Arc::new(auth_session::AuthSessionPlatform::new(client))),
        "legacy" => Ok(Arc::new(legacy::LegacyPlatform::new(client))),
        other => anyhow::bail!(
            "Unknown PLATFORM_SCHEMA '{other}' (expected 'auth-session' or 'legacy')"
        ),
    }
}

/// The platform serializes numeric scalars inconsistently across
/// versions (BigInt as string, Int as number); accept both.
pub(crate) fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
