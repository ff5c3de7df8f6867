use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{VerificationSession, WalletLink};
use crate::platform::PlatformApi;

/// Starts wallet-verification sessions and answers single-shot
/// resolution checks. The polling cadence belongs to the client; every
/// `check` call is one independent platform query with no local state.
#[derive(Clone)]
pub struct SessionService {
    platform: Arc<dyn PlatformApi>,
}

impl SessionService {
    pub fn new(platform: Arc<dyn PlatformApi>) -> Self {
        Self { platform }
    }

    pub async fn start(&self) -> Result<VerificationSession> {
        let session = self.platform.create_verification_session().await?;
        tracing::info!(session_id = %session.id, "verification session created");
        Ok(session)
    }

    /// Reports the wallet currently linked to `session_id`. Unknown
    /// sessions fail with `SessionNotFound`; any other upstream failure
    /// collapses to an unresolved link so a client polling loop is
    /// never broken by a transient error.
    pub async fn check(&self, session_id: &str) -> Result<WalletLink> {
        match self.platform.get_wallet_for_session(session_id).await {
            Ok(wallet_address) => Ok(WalletLink {
                session_id: session_id.to_string(),
                wallet_address,
            }),
            Err(AppError::SessionNotFound(id)) => Err(AppError::SessionNotFound(id)),
            Err(err) => {
                tracing::warn!(session_id, error = %err, "auth check failed; reporting unresolved");
                Ok(WalletLink {
                    session_id: session_id.to_string(),
                    wallet_address: None,
                })
            }
        }
    }
}
