/// Configuration schemas - all config structures defined once with defaults
///
/// Each struct is defined using the config_struct! macro, so a TOML file
/// only needs the keys it wants to change.
use crate::config_struct;
use crate::constants::{
    DEFAULT_CHAR_COUNT, DEFAULT_COMMITMENT, DEFAULT_MIN_HOLD, DEFAULT_TEST_WALLET,
    DEFAULT_TEST_WALLET_BALANCE,
};
use crate::errors::ConfigurationError;
use std::path::PathBuf;

// ============================================================================
// RPC CONFIGURATION
// ============================================================================

config_struct! {
    /// RPC endpoint configuration
    pub struct RpcConfig {
        /// Primary endpoint (empty = unset)
        primary_url: String = String::new(),
        /// Named fallbacks, tried after the primary and its mirror
        fallback_urls: Vec<String> = Vec::new(),
        request_timeout_secs: u64 = 15,
        connect_timeout_secs: u64 = 10,
        commitment: String = DEFAULT_COMMITMENT.to_string(),
    }
}

// ============================================================================
// STORE CONFIGURATION
// ============================================================================

config_struct! {
    /// Assignment store configuration
    pub struct StoreConfig {
        /// `sqlite://<path>`, `sqlite:<path>`, a plain path or `:memory:`.
        /// Empty switches assignments to the hashed fallback.
        database_url: String = String::new(),
    }
}

/// Where assignments live
#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    /// No persistent store, character ids come from the address hash
    Hashed,
    /// In-process SQLite database (lost on exit)
    Memory,
    /// SQLite database file
    Sqlite(PathBuf),
}

impl StoreConfig {
    /// Resolve the configured connection string into a backend
    pub fn backend(&self) -> Result<StoreBackend, ConfigurationError> {
        let url = self.database_url.trim();
        if url.is_empty() {
            return Ok(StoreBackend::Hashed);
        }

        let path = if let Some(rest) = url.strip_prefix("sqlite://") {
            rest
        } else if let Some(rest) = url.strip_prefix("sqlite:") {
            rest
        } else if url.contains("://") {
            return Err(ConfigurationError::InvalidUrl {
                field: "DATABASE_URL".to_string(),
                url: url.to_string(),
                reason: "only sqlite connection strings are supported".to_string(),
            });
        } else {
            url
        };

        if path.is_empty() {
            return Err(ConfigurationError::InvalidUrl {
                field: "DATABASE_URL".to_string(),
                url: url.to_string(),
                reason: "database path is empty".to_string(),
            });
        }

        if path == ":memory:" {
            Ok(StoreBackend::Memory)
        } else {
            Ok(StoreBackend::Sqlite(PathBuf::from(path)))
        }
    }
}

// ============================================================================
// WORLD CONFIGURATION
// ============================================================================

config_struct! {
    /// Holder world defaults
    pub struct WorldConfig {
        /// Default token mint (empty = unset)
        token_mint: String = String::new(),
        min_hold: f64 = DEFAULT_MIN_HOLD,
        char_count: u32 = DEFAULT_CHAR_COUNT,

        // Test wallet injection
        test_wallet_enabled: bool = true,
        test_wallet: String = DEFAULT_TEST_WALLET.to_string(),
        test_wallet_balance: f64 = DEFAULT_TEST_WALLET_BALANCE,
    }
}

// ============================================================================
// WEBSERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// HTTP server configuration
    pub struct WebserverConfig {
        host: String = "127.0.0.1".to_string(),
        port: u16 = 3000,
        cors_allow_any_origin: bool = true,
    }
}

impl WebserverConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.host.trim().is_empty() {
            return Err(ConfigurationError::InvalidConfig {
                field: "webserver.host".to_string(),
                reason: "host must not be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConfigurationError::InvalidConfig {
                field: "webserver.port".to_string(),
                reason: "port must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }
}

// ============================================================================
// LOGGING CONFIGURATION
// ============================================================================

config_struct! {
    pub struct LoggingConfig {
        /// Mirror console logs into logs/holderworld_YYYY-MM-DD.log
        file_logging: bool = true,
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration, one section per subsystem
    pub struct Config {
        rpc: RpcConfig = RpcConfig::default(),
        store: StoreConfig = StoreConfig::default(),
        world: WorldConfig = WorldConfig::default(),
        webserver: WebserverConfig = WebserverConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}
