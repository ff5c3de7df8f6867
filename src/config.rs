use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_SUPPLY_PER_TOKEN, DEFAULT_MINT_PRICE_MAJOR, DEFAULT_PACK_SIZE, DEFAULT_PORT,
    DEFAULT_TX_POLL_INTERVAL_MS, DEFAULT_TX_POLL_TIMEOUT_MS, MINOR_UNIT_DECIMALS,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Platform
    pub platform_url: String,
    pub platform_token: String,
    pub platform_schema: String,

    // Mint economics
    pub treasury_address: String,
    pub collection_id: u64,
    pub mint_price_major: u64,
    pub pack_size: usize,
    pub max_supply_per_token: u64,

    // Charge confirmation polling
    pub tx_poll_interval_ms: u64,
    pub tx_poll_timeout_ms: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            platform_url: env::var("PLATFORM_URL")?,
            platform_token: env::var("PLATFORM_TOKEN")?,
            platform_schema: env::var("PLATFORM_SCHEMA")
                .unwrap_or_else(|_| "auth-session".to_string()),

            treasury_address: env::var("TREASURY_ADDRESS")?,
            collection_id: env::var("COLLECTION_ID")?.parse()?,
            mint_price_major: env::var("MINT_PRICE")
                .unwrap_or_else(|_| DEFAULT_MINT_PRICE_MAJOR.to_string())
                .parse()?,
            pack_size: env::var("PACK_SIZE")
                .unwrap_or_else(|_| DEFAULT_PACK_SIZE.to_string())
                .parse()?,
            max_supply_per_token: env::var("MAX_SUPPLY_PER_TOKEN")
                .unwrap_or_else(|_| DEFAULT_MAX_SUPPLY_PER_TOKEN.to_string())
                .parse()?,

            tx_poll_interval_ms: env::var("TX_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| DEFAULT_TX_POLL_INTERVAL_MS.to_string())
                .parse()?,
            tx_poll_timeout_ms: env::var("TX_POLL_TIMEOUT_MS")
                .unwrap_or_else(|_| DEFAULT_TX_POLL_TIMEOUT_MS.to_string())
                .parse()?,

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.platform_url.trim().is_empty() {
            anyhow::bail!("PLATFORM_URL is empty");
        }
        if self.platform_token.trim().is_empty() {
            anyhow::bail!("PLATFORM_TOKEN is empty");
        }
        if self.treasury_address.trim().is_empty() {
            anyhow::bail!("TREASURY_ADDRESS is empty");
        }
        if self.pack_size == 0 {
            anyhow::bail!("PACK_SIZE must be > 0");
        }
        if self.tx_poll_interval_ms == 0 || self.tx_poll_timeout_ms == 0 {
            anyhow::bail!("poll interval and timeout must be > 0");
        }

        if self.treasury_address.starts_with("0x0000") {
            tracing::warn!("Using placeholder treasury address");
        }
        if self.tx_poll_interval_ms > self.tx_poll_timeout_ms {
            tracing::warn!("Poll interval exceeds poll timeout; at most one poll will run");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    /// Pack price in the platform's minor unit. Exact integer
    /// arithmetic: a u64 price widened to u128 cannot overflow the
    /// 10^18 multiply.
    pub fn mint_price_minor_units(&self) -> u128 {
        u128::from(self.mint_price_major) * 10u128.pow(MINOR_UNIT_DECIMALS)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.tx_poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.tx_poll_timeout_ms)
    }

    pub fn is_testnet(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }
}

#[cfg(test)]
impl Config {
    /// In-memory config with fast poll timings for saga tests.
    pub(crate) fn for_tests() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            platform_url: "http://platform.invalid/graphql".to_string(),
            platform_token: "test-token".to_string(),
            platform_schema: "auth-session".to_string(),
            treasury_address: "0xtreasury".to_string(),
            collection_id: 7777,
            mint_price_major: 10,
            pack_size: 5,
            max_supply_per_token: 50,
            tx_poll_interval_ms: 10,
            tx_poll_timeout_ms: 200,
            cors_allowed_origins: "*".to_string(),
        }
    }
}
