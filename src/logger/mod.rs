//! Structured logging for HolderWorld
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via `--debug <tag>`
//! - Dual output: colored console + daily log file
//!
//! ## Usage
//!
//! ```rust,ignore
//! use holderworld::logger::{self, LogTag};
//!
//! logger::info(LogTag::Holders, "Fetched 42 holders");
//! logger::debug(LogTag::Rpc, "Trying mainnet.helius-rpc.com"); // Only with --debug rpc
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, after CLI flags are parsed:
//! ```rust,ignore
//! logger::init(LoggerConfig::from_flags(&debug_tags, verbose, file_logging));
//! ```

mod config;
mod core;
mod file;
mod format;
mod levels;
mod tags;

pub use config::{get_logger_config, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Installs the configuration and opens the daily log file when file
/// logging is enabled. Call before starting services.
pub fn init(config: LoggerConfig) {
    config::set_logger_config(config);
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when `--debug <tag>` (or `--debug all`) was given for the tag.
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with `--verbose`)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this during shutdown to ensure all logs are written to disk.
pub fn flush() {
    file::flush_file_logging();
}
