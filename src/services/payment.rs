use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::TransactionState;
use crate::platform::PlatformApi;

use super::poll::{poll_until, PollState};

/// Runs the charge sub-saga for one mint request: resolve the wallet
/// bound to the session, submit a charge to the treasury, then watch
/// the transaction until it settles one way or the other.
///
/// The confirmation loop holds the originating request open for up to
/// the full timeout and has no cancellation hook; callers that must
/// survive a client disconnect run it on a spawned task.
#[derive(Clone)]
pub struct PaymentOrchestrator {
    platform: Arc<dyn PlatformApi>,
    treasury_address: String,
    amount_minor_units: u128,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(platform: Arc<dyn PlatformApi>, config: &Config) -> Self {
        Self {
            platform,
            treasury_address: config.treasury_address.clone(),
            amount_minor_units: config.mint_price_minor_units(),
            poll_interval: config.poll_interval(),
            poll_timeout: config.poll_timeout(),
        }
    }

    /// Wallet bound to the session. A session with no linked wallet is
    /// a caller error: the charge must never be created against an
    /// unresolved session.
    pub async fn resolve_wallet(&self, session_id: &str) -> Result<String> {
        self.platform
            .get_wallet_for_session(session_id)
            .await?
            .ok_or(AppError::WalletNotLinked)
    }

    /// Creates the charge and polls it to a terminal state. Returns the
    /// transaction id on success so the caller can correlate the mint.
    pub async fn charge_and_confirm(&self, session_id: &str) -> Result<String> {
        let receipt = self
            .platform
            .create_charge(&self.treasury_address, self.amount_minor_units, session_id)
            .await?;
        tracing::info!(
            transaction_id = %receipt.transaction_id,
            state = %receipt.state,
            amount = %self.amount_minor_units,
            "charge submitted"
        );

        let transaction_id = receipt.transaction_id;
        let confirmed = poll_until(self.poll_interval, self.poll_timeout, || {
            let platform = Arc::clone(&self.platform);
            let transaction_id = transaction_id.clone();
            async move {
                match platform.get_transaction_state(&transaction_id).await {
                    Ok(state) if state.is_terminal_success() => Ok(PollState::Ready(state)),
                    Ok(state) if state.is_terminal_failure() => {
                        Err(AppError::PaymentRejected { state })
                    }
                    Ok(state) => {
                        tracing::debug!(transaction_id = %transaction_id, state = %state, "charge not settled yet");
                        Ok(PollState::Pending)
                    }
                    // Transient poll failures must not break the saga;
                    // the deadline bounds how long we keep trying.
                    Err(err) => {
                        tracing::debug!(transaction_id = %transaction_id, error = %err, "state poll failed; will retry");
                        Ok(PollState::Pending)
                    }
                }
            }
        })
        .await?;

        match confirmed {
            Some(state) => {
                tracing::info!(transaction_id = %transaction_id, state = %state, "payment confirmed");
                Ok(transaction_id)
            }
            None => Err(AppError::PaymentTimeout),
        }
    }
}
