//! Adapter for the older platform deployment, which exposed the
//! verification flow under different operation names (`RequestAccount`
//! / `GetWallet`) and numeric collection scalars.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{
    ChargeReceipt, MintItem, MintReceipt, TokenBalance, TokenSupply, TransactionState,
    VerificationSession,
};

use super::{value_as_u64, GraphqlClient, PlatformApi};

const REQUEST_ACCOUNT: &str = r#"
mutation RequestAccount {
  RequestAccount {
    qrCode
    verificationId
  }
}"#;

const GET_WALLET: &str = r#"
query GetWallet($verificationId: String!) {
  GetWallet(verificationId: $verificationId) {
    account {
      address
    }
  }
}"#;

const CREATE_TRANSACTION: &str = r#"
mutation CreateTransaction($recipient: String!, $value: BigInt!) {
  CreateTransaction(recipient: $recipient, value: $value) {
    id
    state
  }
}"#;

const GET_TRANSACTION: &str = r#"
query GetTransaction($id: ID!) {
  GetTransaction(id: $id) {
    state
  }
}"#;

const MINT_TOKEN: &str = r#"
mutation MintToken($collectionId: Int!, $recipients: [MintInput!]!) {
  MintToken(collectionId: $collectionId, recipients: $recipients) {
    id
    state
  }
}"#;

const BALANCES_OF: &str = r#"
query BalancesOf($collectionId: Int!, $address: String!) {
  BalancesOf(collectionId: $collectionId, address: $address) {
    tokenId
    value
  }
}"#;

const COLLECTION_TOKENS: &str = r#"
query CollectionTokens($collectionId: Int!) {
  CollectionTokens(collectionId: $collectionId) {
    tokenId
    supply
  }
}"#;

pub struct LegacyPlatform {
    gql: GraphqlClient,
}

impl LegacyPlatform {
    pub fn new(gql: GraphqlClient) -> Self {
        Self { gql }
    }
}

#[async_trait]
impl PlatformApi for LegacyPlatform {
    async fn create_verification_session(&self) -> Result<VerificationSession> {
        let data = self
            .gql
            .execute("RequestAccount", REQUEST_ACCOUNT, json!({}))
            .await?;
        let account = &data["RequestAccount"];

        let id = account
            .get("verificationId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("RequestAccount returned no verificationId".to_string())
            })?;
        let qr_payload = account
            .get("qrCode")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("RequestAccount returned no qrCode".to_string())
            })?;

        Ok(VerificationSession {
            id: id.to_string(),
            state: "PENDING".to_string(),
            qr_payload: qr_payload.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn get_wallet_for_session(&self, session_id: &str) -> Result<Option<String>> {
        let data = self
            .gql
            .execute("GetWallet", GET_WALLET, json!({ "verificationId": session_id }))
            .await
            .map_err(|err| match err {
                AppError::Remote { ref messages, .. }
                    if messages.iter().any(|m| m.contains("not found")) =>
                {
                    AppError::SessionNotFound(session_id.to_string())
                }
                other => other,
            })?;

        let wallet = &data["GetWallet"];
        if wallet.is_null() {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }

        let address = wallet
            .get("account")
            .and_then(|a| a.get("address"))
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        Ok(address)
    }

    async fn create_charge(
        &self,
        recipient: &str,
        amount_minor_units: u128,
        _session_ref: &str,
    ) -> Result<ChargeReceipt> {
        // The old schema had no idempotency key on transactions.
        let variables = json!({
            "recipient": recipient,
            "value": amount_minor_units.to_string(),
        });
        let data = self
            .gql
            .execute("CreateTransaction", CREATE_TRANSACTION, variables)
            .await?;
        let tx = &data["CreateTransaction"];

        let transaction_id = tx
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::ChargeInitiation(
                    "CreateTransaction returned no transaction id".to_string(),
                )
            })?;
        let state = tx
            .get("state")
            .and_then(Value::as_str)
            .map(TransactionState::parse)
            .unwrap_or(TransactionState::Pending);

        Ok(ChargeReceipt {
            transaction_id: transaction_id.to_string(),
            state,
        })
    }

    async fn get_transaction_state(&self, transaction_id: &str) -> Result<TransactionState> {
        let data = self
            .gql
            .execute("GetTransaction", GET_TRANSACTION, json!({ "id": transaction_id }))
            .await?;
        let raw = data["GetTransaction"]
            .get("state")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("GetTransaction returned no state".to_string())
            })?;
        Ok(TransactionState::parse(raw))
    }

    async fn batch_mint(
        &self,
        collection_id: u64,
        recipient: &str,
        items: &[MintItem],
    ) -> Result<MintReceipt> {
        let recipients: Vec<Value> = items
            .iter()
            .map(|item| {
                json!({
                    "address": recipient,
                    "tokenId": item.token_id,
                    "amount": item.amount,
                })
            })
            .collect();
        let variables = json!({
            "collectionId": collection_id,
            "recipients": recipients,
        });
        let data = self.gql.execute("MintToken", MINT_TOKEN, variables).await?;
        let mint = &data["MintToken"];

        let request_id = mint
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("MintToken returned no request id".to_string())
            })?;
        let state = mint
            .get("state")
            .and_then(Value::as_str)
            .map(TransactionState::parse)
            .unwrap_or(TransactionState::Pending);

        Ok(MintReceipt {
            request_id: request_id.to_string(),
            state,
        })
    }

    async fn get_token_balances(
        &self,
        wallet: &str,
        collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenBalance>> {
        let variables = json!({
            "collectionId": collection_id,
            "address": wallet,
        });
        let data = self.gql.execute("BalancesOf", BALANCES_OF, variables).await?;

        let entries = data["BalancesOf"].as_array().cloned().unwrap_or_default();
        let balances = entries
            .iter()
            .filter_map(|entry| {
                let token_id = entry.get("tokenId").and_then(value_as_u64)?;
                let balance = entry.get("value").and_then(value_as_u64)?;
                token_ids
                    .contains(&token_id)
                    .then_some(TokenBalance { token_id, balance })
            })
            .collect();
        Ok(balances)
    }

    async fn get_collection_supply(
        &self,
        collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenSupply>> {
        let data = self
            .gql
            .execute(
                "CollectionTokens",
                COLLECTION_TOKENS,
                json!({ "collectionId": collection_id }),
            )
            .await?;

        let entries = data["CollectionTokens"].as_array().cloned().unwrap_or_default();
        let supplies = entries
            .iter()
            .filter_map(|entry| {
                let token_id = entry.get("tokenId").and_then(value_as_u64)?;
                if !token_ids.contains(&token_id) {
                    return None;
                }
                let supply = entry.get("supply").and_then(value_as_u64).unwrap_or(0);
                Some(TokenSupply { token_id, supply })
            })
            .collect();
        Ok(supplies)
    }
}
