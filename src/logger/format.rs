//! Log formatting and output with ANSI colors and text wrapping
//!
//! Handles:
//! - Colorized console output with tag and level formatting
//! - Text wrapping at word boundaries
//! - Dual output (console + file)

use super::file::write_to_file;
use super::tags::LogTag;
use chrono::Local;
use colored::*;
use std::io::{stderr, ErrorKind, Write};

/// Log format widths for alignment
const TAG_WIDTH: usize = 10;
const LOG_TYPE_WIDTH: usize = 8;
const BRACKET_SPACE_WIDTH: usize = 3;
const TOTAL_PREFIX_WIDTH: usize = TAG_WIDTH + LOG_TYPE_WIDTH + BRACKET_SPACE_WIDTH * 2;

/// Maximum line length before wrapping
const MAX_LINE_LENGTH: usize = 145;

/// Format and output a log message
pub fn format_and_log(tag: LogTag, log_type: &str, message: &str) {
    let now = Local::now();
    let prefix = format!("{} ", now.format("%H:%M:%S")).dimmed().to_string();

    let base_line = format!(
        "{}[{}] [{}] ",
        prefix,
        format_tag(&tag),
        format_log_type(log_type)
    );

    let prefix_width = strip_ansi_codes(&prefix).len();
    let base_length = strip_ansi_codes(&base_line)
        .len()
        .max(TOTAL_PREFIX_WIDTH + prefix_width);
    let available_space = if MAX_LINE_LENGTH > base_length {
        MAX_LINE_LENGTH - base_length
    } else {
        50
    };

    let message_chunks = wrap_text(message, available_space);
    let timestamp = now.format("%Y-%m-%d %H:%M:%S").to_string();
    let tag_clean = tag.to_plain_string();
    let continuation_prefix = " ".repeat(prefix_width + TOTAL_PREFIX_WIDTH);

    for (index, chunk) in message_chunks.iter().enumerate() {
        if index == 0 {
            print_console(&format!("{}{}", base_line, chunk));
        } else {
            print_console(&format!("{}{}", continuation_prefix, chunk));
        }
        write_to_file(&format!(
            "{} [{}] [{}] {}",
            timestamp, tag_clean, log_type, chunk
        ));
    }
}

/// Format a tag with appropriate color
fn format_tag(tag: &LogTag) -> ColoredString {
    let label = format!("{:<width$}", tag.to_plain_string(), width = TAG_WIDTH);
    match tag {
        LogTag::System => label.bright_yellow().bold(),
        LogTag::Config => label.bright_white().bold(),
        LogTag::Rpc => label.bright_cyan().bold(),
        LogTag::Holders => label.bright_green().bold(),
        LogTag::Store => label.bright_blue().bold(),
        LogTag::World => label.bright_magenta().bold(),
        LogTag::Webserver => label.bright_purple().bold(),
    }
}

/// Format log type with appropriate color
fn format_log_type(log_type: &str) -> ColoredString {
    let label = format!("{:<width$}", log_type, width = LOG_TYPE_WIDTH);
    match log_type.to_uppercase().as_str() {
        "ERROR" => label.bright_red().bold(),
        "WARNING" => label.bright_yellow().bold(),
        "DEBUG" => label.bright_blue(),
        "VERBOSE" => label.dimmed(),
        _ => label.white().bold(),
    }
}

/// Console lines go to stderr; stdout carries command output
fn print_console(message: &str) {
    let mut handle = stderr().lock();
    if let Err(e) = writeln!(handle, "{}", message) {
        if e.kind() == ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
    }
}

/// Remove ANSI color codes from text
fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::new();
    let mut in_escape = false;

    for ch in text.chars() {
        if ch == '\x1b' {
            in_escape = true;
        } else if in_escape && ch == 'm' {
            in_escape = false;
        } else if !in_escape {
            result.push(ch);
        }
    }
    result
}

/// Wrap text at word boundaries, respecting existing newlines
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut result = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= max_width {
            result.push(line.to_string());
            continue;
        }

        let mut current_line = String::new();
        for word in line.split_whitespace() {
            let word_length = word.chars().count();
            let current_length = current_line.chars().count();

            if word_length > max_width {
                if !current_line.is_empty() {
                    result.push(std::mem::take(&mut current_line));
                }
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(max_width.max(1)) {
                    result.push(chunk.iter().collect());
                }
            } else if current_line.is_empty() {
                current_line = word.to_string();
            } else if current_length + word_length + 1 <= max_width {
                current_line.push(' ');
                current_line.push_str(word);
            } else {
                result.push(std::mem::replace(&mut current_line, word.to_string()));
            }
        }

        if !current_line.is_empty() {
            result.push(current_line);
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }

    result
}
