/// Application constants

// Token catalog (closed set: the three playable kinds)
pub const TOKEN_IDS: [u64; 3] = [1, 2, 3];

// Supply cap enforced per token id when computing remaining packs
pub const DEFAULT_MAX_SUPPLY_PER_TOKEN: u64 = 50;

// Pack (loot drop) configuration
pub const DEFAULT_PACK_SIZE: usize = 5;
pub const DEFAULT_MINT_PRICE_MAJOR: u64 = 10;

// The platform denominates amounts in 10^-18 of a token
pub const MINOR_UNIT_DECIMALS: u32 = 18;

// Charge confirmation polling
pub const DEFAULT_TX_POLL_INTERVAL_MS: u64 = 3_000;
pub const DEFAULT_TX_POLL_TIMEOUT_MS: u64 = 120_000;

// Outbound HTTP client
pub const PLATFORM_CONNECT_TIMEOUT_SECS: u64 = 4;
pub const PLATFORM_REQUEST_TIMEOUT_SECS: u64 = 15;

// Default listen port
pub const DEFAULT_PORT: u16 = 5000;
