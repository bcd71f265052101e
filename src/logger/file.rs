/// Daily log file persistence
///
/// Files are written to `logs/holderworld_YYYY-MM-DD.log` under the data root.
/// The handle is opened lazily and rotated when the date changes.
use super::config::get_logger_config;
use chrono::Local;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};

struct LogFile {
    date: String,
    writer: BufWriter<File>,
}

static LOG_FILE: Lazy<Mutex<Option<LogFile>>> = Lazy::new(|| Mutex::new(None));

/// Open today's log file if file logging is enabled
pub fn init_file_logging() {
    if !get_logger_config().file_logging {
        return;
    }
    let mut guard = LOG_FILE.lock();
    if guard.is_none() {
        *guard = open_log_file(&today());
    }
}

/// Append a plain-text line to the current log file
pub fn write_to_file(line: &str) {
    if !get_logger_config().file_logging {
        return;
    }

    let mut guard = LOG_FILE.lock();
    let date = today();
    let needs_rotation = guard.as_ref().map(|f| f.date != date).unwrap_or(true);
    if needs_rotation {
        if let Some(mut old) = guard.take() {
            let _ = old.writer.flush();
        }
        *guard = open_log_file(&date);
    }

    if let Some(file) = guard.as_mut() {
        if writeln!(file.writer, "{}", line).is_err() {
            *guard = None;
        }
    }
}

/// Flush buffered log lines to disk
pub fn flush_file_logging() {
    if let Some(file) = LOG_FILE.lock().as_mut() {
        let _ = file.writer.flush();
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn open_log_file(date: &str) -> Option<LogFile> {
    let logs_dir = crate::paths::get_logs_directory();
    if std::fs::create_dir_all(&logs_dir).is_err() {
        return None;
    }

    let path = logs_dir.join(format!("holderworld_{}.log", date));
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => Some(LogFile {
            date: date.to_string(),
            writer: BufWriter::new(file),
        }),
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
            None
        }
    }
}
