/// Global constants used across HolderWorld
///
/// This module contains system-wide constants that are not configurable
/// and are used across multiple modules.

// ============================================================================
// SOLANA CONSTANTS
// ============================================================================

/// Commitment used for every account read
pub const DEFAULT_COMMITMENT: &str = "confirmed";

// ============================================================================
// RPC ENDPOINT CONSTANTS
// ============================================================================

/// Public mainnet endpoint, always the last candidate
pub const PUBLIC_FALLBACK_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Hostnames that serve the same RPC API; each one is the other's mirror
pub const MIRRORED_RPC_HOSTS: (&str, &str) = ("rpc.helius.xyz", "mainnet.helius-rpc.com");

// ============================================================================
// CHARACTER ASSIGNMENT CONSTANTS
// ============================================================================

/// Hard cap on character ids handed out, whatever pool size is requested
pub const MAX_CHARACTER_ID: u32 = 2;

/// Modulus of the wallet-address rolling hash (2^31 - 1)
pub const CHAR_HASH_MODULUS: u64 = 2_147_483_647;

/// Multiplier of the wallet-address rolling hash
pub const CHAR_HASH_MULTIPLIER: u64 = 31;

// ============================================================================
// WORLD DEFAULTS
// ============================================================================

/// Default minimum UI balance for a holder to appear in the world
pub const DEFAULT_MIN_HOLD: f64 = 10_000.0;

/// Default requested character pool size
pub const DEFAULT_CHAR_COUNT: u32 = 3;

/// Well-known wallet injected into every holder set so the pipeline is always exercised
pub const DEFAULT_TEST_WALLET: &str = "J311MsgsfcChafguWmahyxdzHvYchMcWM8vVoc4bqGWe";

/// UI balance given to the injected test wallet (15M tokens)
pub const DEFAULT_TEST_WALLET_BALANCE: f64 = 15_000_000.0;

/// Settings key holding the active token mint
pub const TOKEN_MINT_SETTING_KEY: &str = "tokenMint";
