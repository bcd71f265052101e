//! Configuration utilities - loading, layering and access helpers
//!
//! Load order: built-in defaults → TOML file → `.env` → process environment.

use super::schemas::Config;
use crate::errors::ConfigurationError;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::path::Path;

/// Global configuration instance
///
/// Set once at startup by `load_config*`. Core components take explicit
/// config sections instead of reading this directly.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Load configuration from the default location and initialize the global CONFIG
pub fn load_config() -> Result<(), ConfigurationError> {
    load_config_from_path(&crate::paths::get_config_path())
}

/// Load configuration from a specific file path and initialize the global CONFIG
///
/// A missing file is not an error: defaults plus environment overrides apply.
pub fn load_config_from_path(path: &Path) -> Result<(), ConfigurationError> {
    let _ = dotenv::dotenv();
    let config = build_config(path, |key| std::env::var(key).ok())?;
    init_config(config)
}

/// Install an already-built configuration as the global CONFIG
pub fn init_config(config: Config) -> Result<(), ConfigurationError> {
    CONFIG
        .set(RwLock::new(config))
        .map_err(|_| ConfigurationError::Generic("Config already initialized".to_string()))
}

/// Read a TOML file (if present) and apply environment overrides
///
/// `env` is the variable lookup, so callers and tests can supply their own.
pub fn build_config<F>(path: &Path, env: F) -> Result<Config, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::Generic(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str::<Config>(&contents).map_err(|e| {
            ConfigurationError::Generic(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?
    } else {
        logger::debug(
            LogTag::Config,
            &format!("Config file '{}' not found, using defaults", path.display()),
        );
        Config::default()
    };

    apply_env_overrides(&mut config, env);
    Ok(config)
}

/// Overlay environment variables on top of file/default values
pub fn apply_env_overrides<F>(config: &mut Config, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| env(key).filter(|value| !value.trim().is_empty());
    let first_of = |keys: &[&str]| keys.iter().find_map(|key| non_empty(*key));

    if let Some(url) = non_empty("HELIUS_RPC_URL") {
        config.rpc.primary_url = url;
    }
    for key in ["SOLANA_RPC_FALLBACK_URL", "SOLANA_RPC_URL"] {
        if let Some(url) = non_empty(key) {
            config.rpc.fallback_urls.push(url);
        }
    }

    if let Some(url) = non_empty("DATABASE_URL") {
        config.store.database_url = url;
    }

    if let Some(mint) = first_of(&["NEXT_PUBLIC_TOKEN_MINT", "TOKEN_MINT"]) {
        config.world.token_mint = mint.trim().to_string();
    }
    if let Some(raw) = first_of(&["NEXT_PUBLIC_MIN_HOLD", "MIN_HOLD"]) {
        match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => config.world.min_hold = value,
            _ => logger::warning(
                LogTag::Config,
                &format!("Ignoring invalid MIN_HOLD value '{}'", raw),
            ),
        }
    }
    if let Some(raw) = first_of(&["NEXT_PUBLIC_CHAR_COUNT", "CHAR_COUNT"]) {
        match raw.trim().parse::<u32>() {
            Ok(value) if value >= 1 => config.world.char_count = value,
            _ => logger::warning(
                LogTag::Config,
                &format!("Ignoring invalid CHAR_COUNT value '{}'", raw),
            ),
        }
    }

    if let Some(host) = non_empty("HOST") {
        config.webserver.host = host.trim().to_string();
    }
    if let Some(raw) = non_empty("PORT") {
        match raw.trim().parse::<u16>() {
            Ok(port) => config.webserver.port = port,
            Err(_) => logger::warning(
                LogTag::Config,
                &format!("Ignoring invalid PORT value '{}'", raw),
            ),
        }
    }
}

/// Execute a function with read access to the configuration
///
/// Falls back to defaults when the global config was never loaded.
///
/// # Example
/// ```ignore
/// let min_hold = with_config(|cfg| cfg.world.min_hold);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match CONFIG.get() {
        Some(lock) => f(&lock.read()),
        None => f(&Config::default()),
    }
}

/// Get a clone of the entire configuration
///
/// Useful when values must be held across await points.
pub fn get_config_clone() -> Config {
    with_config(|cfg| cfg.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = build_config(&dir.path().join("absent.toml"), env_from(&[])).unwrap();
        assert_eq!(config.world.min_hold, 10_000.0);
        assert!(config.rpc.primary_url.is_empty());
        assert!(config.store.database_url.is_empty());
    }

    #[test]
    fn test_file_then_env_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[rpc]\nprimary_url = \"https://file.example.com\"\nfallback_urls = [\"https://extra.example.com\"]\n[world]\nchar_count = 5\n",
        )
        .unwrap();

        let config = build_config(
            &path,
            env_from(&[
                ("HELIUS_RPC_URL", "https://mainnet.helius-rpc.com/?api-key=k"),
                ("SOLANA_RPC_URL", "https://second.example.com"),
                ("SOLANA_RPC_FALLBACK_URL", "https://first.example.com"),
                ("NEXT_PUBLIC_MIN_HOLD", "2500"),
                ("DATABASE_URL", "sqlite://world.db"),
            ]),
        )
        .unwrap();

        assert_eq!(
            config.rpc.primary_url,
            "https://mainnet.helius-rpc.com/?api-key=k"
        );
        assert_eq!(
            config.rpc.fallback_urls,
            vec![
                "https://extra.example.com".to_string(),
                "https://first.example.com".to_string(),
                "https://second.example.com".to_string(),
            ]
        );
        assert_eq!(config.world.char_count, 5);
        assert_eq!(config.world.min_hold, 2500.0);
        assert_eq!(config.store.database_url, "sqlite://world.db");
    }

    #[test]
    fn test_invalid_numeric_env_is_ignored() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env_from(&[("MIN_HOLD", "lots"), ("CHAR_COUNT", "0"), ("PORT", "99999")]),
        );
        assert_eq!(config.world.min_hold, 10_000.0);
        assert_eq!(config.world.char_count, 3);
        assert_eq!(config.webserver.port, 3000);
    }

    #[test]
    fn test_public_alias_wins_over_unprefixed_env() {
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env_from(&[
                ("TOKEN_MINT", "MintA"),
                ("NEXT_PUBLIC_TOKEN_MINT", " MintB "),
                ("MIN_HOLD", "1"),
                ("NEXT_PUBLIC_MIN_HOLD", "2"),
                ("CHAR_COUNT", "4"),
                ("NEXT_PUBLIC_CHAR_COUNT", "6"),
            ]),
        );
        assert_eq!(config.world.token_mint, "MintB");
        assert_eq!(config.world.min_hold, 2.0);
        assert_eq!(config.world.char_count, 6);

        // Blank public values fall through to the unprefixed ones
        let mut config = Config::default();
        apply_env_overrides(
            &mut config,
            env_from(&[("TOKEN_MINT", " MintA "), ("NEXT_PUBLIC_TOKEN_MINT", "  ")]),
        );
        assert_eq!(config.world.token_mint, "MintA");
    }

    #[test]
    fn test_broken_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[world\nmin_hold = ").unwrap();
        assert!(build_config(&path, env_from(&[])).is_err());
    }
}
