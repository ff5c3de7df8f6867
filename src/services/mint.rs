use std::sync::Arc;

use rand::Rng;

use crate::config::Config;
use crate::constants::TOKEN_IDS;
use crate::error::{AppError, Result};
use crate::models::{token_name, MintItem, MintedToken};
use crate::platform::PlatformApi;

/// Builds a loot pack and submits it as one batch mint. Only invoked
/// after the payment orchestrator confirms the charge.
#[derive(Clone)]
pub struct MintDispatcher {
    platform: Arc<dyn PlatformApi>,
    collection_id: u64,
    pack_size: usize,
}

/// Each pack slot is drawn independently and uniformly from the
/// catalog, repeats allowed.
pub fn draw_pack(pack_size: usize) -> Vec<MintItem> {
    let mut rng = rand::rng();
    (0..pack_size)
        .map(|_| MintItem {
            token_id: TOKEN_IDS[rng.random_range(0..TOKEN_IDS.len())],
            amount: 1,
        })
        .collect()
}

impl MintDispatcher {
    pub fn new(platform: Arc<dyn PlatformApi>, config: &Config) -> Self {
        Self {
            platform,
            collection_id: config.collection_id,
            pack_size: config.pack_size,
        }
    }

    /// Draws the pack and submits the batch mint with `recipient` on
    /// every item. The platform settles the mint asynchronously; the
    /// request id is logged and the drawn pack is returned without
    /// waiting for settlement.
    pub async fn dispatch(&self, recipient: &str) -> Result<Vec<MintedToken>> {
        let items = draw_pack(self.pack_size);
        let receipt = self
            .platform
            .batch_mint(self.collection_id, recipient, &items)
            .await
            .map_err(|err| {
                // Known gap: the confirmed charge is not reversed here.
                tracing::error!(
                    recipient,
                    error = %err,
                    "batch mint failed after a confirmed payment; charge is not refunded"
                );
                AppError::MintDispatch(err.to_string())
            })?;

        tracing::info!(
            request_id = %receipt.request_id,
            state = %receipt.state,
            recipient,
            count = items.len(),
            "batch mint submitted"
        );

        Ok(items
            .iter()
            .map(|item| MintedToken {
                id: item.token_id,
                name: token_name(item.token_id).to_string(),
            })
            .collect())
    }
}
