//! Adapter for the current platform schema (the auth-session API).
//! Operation and field names here were confirmed against the live
//! endpoint; the older deployment is covered by [`crate::platform::legacy`].

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{
    ChargeReceipt, MintItem, MintReceipt, TokenBalance, TokenSupply, TransactionState,
    VerificationSession,
};

use super::{value_as_u64, GraphqlClient, PlatformApi};

const CREATE_AUTH_SESSION: &str = r#"
mutation CreateAuthSession($input: CreateAuthSessionInput!) {
  CreateAuthSession(input: $input) {
    id
    state
    authenticationUrl
  }
}"#;

const GET_AUTH_SESSION: &str = r#"
query GetAuthSession($id: ID!) {
  GetAuthSession(id: $id) {
    id
    state
    wallet {
      id
    }
  }
}"#;

const TRANSFER_BALANCE: &str = r#"
mutation TransferBalance($recipient: String!, $amount: BigInt!, $idempotencyKey: String) {
  TransferBalance(recipient: $recipient, amount: $amount, idempotencyKey: $idempotencyKey) {
    id
    state
  }
}"#;

const GET_TRANSACTION: &str = r#"
query GetTransaction($id: ID!) {
  GetTransaction(id: $id) {
    id
    state
  }
}"#;

const BATCH_MINT: &str = r#"
mutation BatchMint($collectionId: BigInt!, $recipients: [MintRecipient!]!) {
  BatchMint(collectionId: $collectionId, recipients: $recipients) {
    id
    state
  }
}"#;

const TOKENS_BY_OWNER: &str = r#"
query GetTokensByOwner($collectionId: BigInt!, $wallet: String!) {
  TokensByOwner(collectionId: $collectionId, address: $wallet) {
    tokenId
    balance
  }
}"#;

const COLLECTION_TOKENS: &str = r#"
query GetCollectionTokens($collectionId: BigInt!, $tokenIds: [String!]) {
  Tokens(collectionId: $collectionId, filter: { tokenId_in: $tokenIds }) {
    tokenId
    totalSupply
  }
}"#;

pub struct AuthSessionPlatform {
    gql: GraphqlClient,
}

impl AuthSessionPlatform {
    pub fn new(gql: GraphqlClient) -> Self {
        Self { gql }
    }
}

#[async_trait]
impl PlatformApi for AuthSessionPlatform {
    async fn create_verification_session(&self) -> Result<VerificationSession> {
        let data = self
            .gql
            .execute("CreateAuthSession", CREATE_AUTH_SESSION, json!({ "input": {} }))
            .await?;
        let session = &data["CreateAuthSession"];

        let id = session
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("CreateAuthSession returned no id".to_string())
            })?;
        let qr_payload = session
            .get("authenticationUrl")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol(
                    "CreateAuthSession returned no authenticationUrl".to_string(),
                )
            })?;
        let state = session
            .get("state")
            .and_then(Value::as_str)
            .unwrap_or("PENDING");

        Ok(VerificationSession {
            id: id.to_string(),
            state: state.to_string(),
            qr_payload: qr_payload.to_string(),
            created_at: Utc::now(),
        })
    }

    async fn get_wallet_for_session(&self, session_id: &str) -> Result<Option<String>> {
        let data = self
            .gql
            .execute("GetAuthSession", GET_AUTH_SESSION, json!({ "id": session_id }))
            .await
            .map_err(|err| match err {
                // The platform reports unknown ids as a GraphQL error
                // rather than a null payload.
                AppError::Remote { ref messages, .. }
                    if messages.iter().any(|m| m.contains("not found")) =>
                {
                    AppError::SessionNotFound(session_id.to_string())
                }
                other => other,
            })?;

        let session = &data["GetAuthSession"];
        if session.is_null() {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }

        let wallet = session
            .get("wallet")
            .and_then(|w| w.get("id"))
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        Ok(wallet)
    }

    async fn create_charge(
        &self,
        recipient: &str,
        amount_minor_units: u128,
        session_ref: &str,
    ) -> Result<ChargeReceipt> {
        let variables = json!({
            "recipient": recipient,
            "amount": amount_minor_units.to_string(),
            "idempotencyKey": session_ref,
        });
        let data = self
            .gql
            .execute("TransferBalance", TRANSFER_BALANCE, variables)
            .await?;
        let transfer = &data["TransferBalance"];

        let transaction_id = transfer
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                AppError::ChargeInitiation(
                    "TransferBalance returned no transaction id".to_string(),
                )
            })?;
        let state = transfer
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
                    "account": recipient,
                    "mintParams": {
                        "tokenId": item.token_id.to_string(),
                        "amount": item.amount.to_string(),
                    },
                })
            })
            .collect();
        let variables = json!({
            "collectionId": collection_id.to_string(),
            "recipients": recipients,
        });
        let data = self.gql.execute("BatchMint", BATCH_MINT, variables).await?;
        let mint = &data["BatchMint"];

        let request_id = mint
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AppError::UpstreamProtocol("BatchMint returned no request id".to_string())
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
            "collectionId": collection_id.to_string(),
            "wallet": wallet,
        });
        let data = self
            .gql
            .execute("GetTokensByOwner", TOKENS_BY_OWNER, variables)
            .await?;

        let entries = data["TokensByOwner"].as_array().cloned().unwrap_or_default();
        let balances = entries
            .iter()
            .filter_map(|entry| {
                let token_id = entry.get("tokenId").and_then(value_as_u64)?;
                let balance = entry.get("balance").and_then(value_as_u64)?;
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
        let variables = json!({
            "collectionId": collection_id.to_string(),
            "tokenIds": token_ids.iter().map(|id| id.to_string()).collect::<Vec<_>>(),
        });
        let data = self
            .gql
            .execute("GetCollectionTokens", COLLECTION_TOKENS, variables)
            .await?;

        let entries = data["Tokens"].as_array().cloned().unwrap_or_default();
        let supplies = entries
            .iter()
            .filter_map(|entry| {
                let token_id = entry.get("tokenId").and_then(value_as_u64)?;
                let supply = entry.get("totalSupply").and_then(value_as_u64).unwrap_or(0);
                Some(TokenSupply { token_id, supply })
            })
            .collect();
        Ok(supplies)
    }
}
