//! Scriptable in-memory platform for saga and handler tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{AppError, Result};
use crate::models::{
    ChargeReceipt, MintItem, MintReceipt, TokenBalance, TokenSupply, TransactionState,
    VerificationSession,
};

use super::PlatformApi;

pub struct MockPlatform {
    pub session_id: String,
    /// Wallet currently linked to the session; tests flip this to
    /// simulate the user completing verification out-of-band.
    pub wallet: Mutex<Option<String>>,
    /// States returned by successive `get_transaction_state` calls.
    /// The last entry repeats once the script is exhausted.
    pub tx_states: Mutex<VecDeque<TransactionState>>,
    /// Submitted batches: (collection_id, recipient, items).
    pub minted: Mutex<Vec<(u64, String, Vec<MintItem>)>>,
    pub balances: Vec<TokenBalance>,
    pub supplies: Vec<TokenSupply>,
    pub fail_charge: bool,
    pub fail_mint: bool,
}

impl MockPlatform {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            wallet: Mutex::new(None),
            tx_states: Mutex::new(VecDeque::from([TransactionState::Pending])),
            minted: Mutex::new(Vec::new()),
            balances: Vec::new(),
            supplies: Vec::new(),
            fail_charge: false,
            fail_mint: false,
        }
    }

    pub fn link_wallet(&self, address: &str) {
        *self.wallet.lock().unwrap() = Some(address.to_string());
    }

    pub fn script_tx_states(&self, states: Vec<TransactionState>) {
        *self.tx_states.lock().unwrap() = states.into();
    }

    pub fn mint_count(&self) -> usize {
        self.minted.lock().unwrap().len()
    }
}

#[async_trait]
impl PlatformApi for MockPlatform {
    async fn create_verification_session(&self) -> Result<VerificationSession> {
        Ok(VerificationSession {
            id: self.session_id.clone(),
            state: "PENDING".to_string(),
            qr_payload: format!("https://platform.example/qr/{}", self.session_id),
            created_at: Utc::now(),
        })
    }

    async fn get_wallet_for_session(&self, session_id: &str) -> Result<Option<String>> {
        if session_id != self.session_id {
            return Err(AppError::SessionNotFound(session_id.to_string()));
        }
        Ok(self.wallet.lock().unwrap().clone())
    }

    async fn create_charge(
        &self,
        _recipient: &str,
        _amount_minor_units: u128,
        _session_ref: &str,
    ) -> Result<ChargeReceipt> {
        if self.fail_charge {
            return Err(AppError::ChargeInitiation(
                "platform returned no transaction id".to_string(),
            ));
        }
        Ok(ChargeReceipt {
            transaction_id: "tx-1".to_string(),
            state: TransactionState::Pending,
        })
    }

    async fn get_transaction_state(&self, _transaction_id: &str) -> Result<TransactionState> {
        let mut states = self.tx_states.lock().unwrap();
        if states.len() > 1 {
            Ok(states.pop_front().unwrap_or(TransactionState::Pending))
        } else {
            Ok(states.front().cloned().unwrap_or(TransactionState::Pending))
        }
    }

    async fn batch_mint(
        &self,
        collection_id: u64,
        recipient: &str,
        items: &[MintItem],
    ) -> Result<MintReceipt> {
        if self.fail_mint {
            return Err(AppError::Remote {
                messages: vec!["BatchMint: connection refused".to_string()],
                network: true,
            });
        }
        self.minted
            .lock()
            .unwrap()
            .push((collection_id, recipient.to_string(), items.to_vec()));
        Ok(MintReceipt {
            request_id: "mint-req-1".to_string(),
            state: TransactionState::Pending,
        })
    }

    async fn get_token_balances(
        &self,
        _wallet: &str,
        _collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenBalance>> {
        Ok(self
            .balances
            .iter()
            .filter(|b| token_ids.contains(&b.token_id))
            .cloned()
            .collect())
    }

    async fn get_collection_supply(
        &self,
        _collection_id: u64,
        token_ids: &[u64],
    ) -> Result<Vec<TokenSupply>> {
        Ok(self
            .supplies
            .iter()
            .filter(|s| token_ids.contains(&s.token_id))
            .cloned()
            .collect())
    }
}
