//! Centralized path resolution for HolderWorld
//!
//! All file and directory paths are resolved through this module so the CLI
//! and the server agree on where data lives.
//!
//! Base directory follows platform standards:
//! - **macOS**: `~/Library/Application Support/HolderWorld/`
//! - **Windows**: `%LOCALAPPDATA%\HolderWorld\`
//! - **Linux**: `$XDG_DATA_HOME/HolderWorld/` (fallback `~/.local/share/HolderWorld/`)
//!
//! `HOLDERWORLD_HOME` overrides the base directory.
//!
//! ```text
//! HolderWorld/
//! ├── data/
//! │ └── config.toml
//! └── logs/
//!   └── holderworld_YYYY-MM-DD.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "HolderWorld";

/// Lazy-initialized base directory (thread-safe)
static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    if let Ok(home) = std::env::var("HOLDERWORLD_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home.trim());
        }
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(dir) = dirs::data_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }

    PathBuf::from(APP_DIR)
}

/// Returns the base directory for all HolderWorld data
pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

/// Returns the data directory path (config and databases)
pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

/// Returns the logs directory path
pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

/// Returns the main configuration file path
pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Create the data and logs directories if they do not exist
pub fn ensure_all_directories() -> Result<(), String> {
    for dir in [get_data_directory(), get_logs_directory()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    }
    Ok(())
}
