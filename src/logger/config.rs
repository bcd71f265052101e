/// Logger configuration and per-tag filtering state
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Most detailed level that may be printed
    pub min_level: LogLevel,
    /// Tags with debug output enabled (`--debug <tag>`), "all" enables every tag
    pub debug_tags: HashSet<String>,
    /// Mirror console output into the daily log file
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            file_logging: false,
        }
    }
}

impl LoggerConfig {
    /// Build a config from CLI-style flags
    pub fn from_flags(debug_tags: &[String], verbose: bool, file_logging: bool) -> Self {
        let debug_tags: HashSet<String> = debug_tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        let min_level = if verbose {
            LogLevel::Verbose
        } else if !debug_tags.is_empty() {
            LogLevel::Debug
        } else {
            LogLevel::Info
        };

        Self {
            min_level,
            debug_tags,
            file_logging,
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Get a copy of the active logger configuration
pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

/// Replace the active logger configuration
pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Check whether debug output is enabled for a tag
pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = LOGGER_CONFIG.read();
    config.debug_tags.contains("all") || config.debug_tags.contains(&tag.to_debug_key())
}
