/// Core logging implementation with automatic filtering
///
/// This module contains the central logging logic that:
/// - Checks if a log should be displayed based on level and tag
/// - Delegates to the format module for writing
use super::config::{get_logger_config, is_debug_enabled_for_tag};
use super::levels::LogLevel;
use super::tags::LogTag;

/// Check if a log message should be displayed
///
/// Filtering rules:
/// 1. Errors are always shown
/// 2. Check against minimum log level threshold
/// 3. Debug level requires `--debug <tag>` for that tag
/// 4. Verbose level requires `--verbose`
pub fn should_log(tag: &LogTag, level: LogLevel) -> bool {
    if level == LogLevel::Error {
        return true;
    }

    let config = get_logger_config();

    if level > config.min_level {
        return false;
    }

    if level == LogLevel::Debug {
        return is_debug_enabled_for_tag(tag);
    }

    if level == LogLevel::Verbose {
        return config.min_level == LogLevel::Verbose;
    }

    true
}

/// Internal logging function with automatic filtering
pub fn log_internal(tag: LogTag, level: LogLevel, message: &str) {
    if !should_log(&tag, level) {
        return;
    }

    super::format::format_and_log(tag, level.as_str(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::config::{set_logger_config, LoggerConfig};

    #[test]
    fn test_filtering_rules() {
        set_logger_config(LoggerConfig::from_flags(&["rpc".to_string()], false, false));

        assert!(should_log(&LogTag::Store, LogLevel::Error));
        assert!(should_log(&LogTag::Store, LogLevel::Info));
        assert!(should_log(&LogTag::Rpc, LogLevel::Debug));
        assert!(!should_log(&LogTag::Store, LogLevel::Debug));
        assert!(!should_log(&LogTag::Rpc, LogLevel::Verbose));

        set_logger_config(LoggerConfig::default());
        assert!(!should_log(&LogTag::Rpc, LogLevel::Debug));
    }
}
