//! FILENAME: app/src/logging.rs
// PURPOSE: Unified logging system for the application.
// CONTEXT: Library crates log through the `log` facade with a category as the
// target ("XFILTER", "GRAPH", "LOAD", "SESSION"). This module installs the
// backend that turns every record into a `seq|level|category|message` line.
// stdout carries the JSON-lines protocol, so console output goes to stderr.

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

use crate::AppError;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

/// Global sequence counter
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Global log file handle
pub static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

/// Cached log path
static LOG_PATH: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

static LOGGER: UnifiedLogger = UnifiedLogger;

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Path of the active log file, if one was opened.
pub fn get_log_path() -> Option<PathBuf> {
    LOG_PATH.lock().ok().and_then(|guard| guard.clone())
}

/// Open (and truncate) the log file. Creates missing parent directories.
pub fn init_log_file(path: &Path) -> Result<PathBuf, AppError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let mut log_file = LOG_FILE.lock().map_err(|_| AppError::LockPoisoned)?;
    *log_file = Some(file);

    if let Ok(mut guard) = LOG_PATH.lock() {
        *guard = Some(path.to_path_buf());
    }

    Ok(path.to_path_buf())
}

/// Install the unified logger as the `log` backend.
/// Calling it twice keeps the first logger but still updates the level.
pub fn init_logging(level: LevelFilter, file: Option<&Path>) -> Result<(), AppError> {
    if let Some(path) = file {
        init_log_file(path)?;
    }
    if log::set_logger(&LOGGER).is_err() {
        eprintln!("[LOG_INIT] Logger already installed");
    }
    log::set_max_level(level);
    Ok(())
}

/// Parse a level name ("error", "warn", "info", "debug", "trace", "off").
pub fn parse_level(name: &str) -> Result<LevelFilter, AppError> {
    name.trim()
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Config(format!("unknown log level: {:?}", name)))
}

/// Single-letter level code used in log lines.
pub fn level_code(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

/// Format a log line in unified format
pub fn format_line(seq: u64, level: &str, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

/// Write a log line in unified format
pub fn write_log(level: &str, category: &str, message: &str) {
    let line = format_line(next_seq(), level, category, message);

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", line) {
                eprintln!("[LOG_ERROR] Failed to write: {}", e);
            }
            let _ = file.flush();
        }
    }

    eprintln!("{}", line);
}

// ============================================================================
// LOG BACKEND
// ============================================================================

/// `log` backend writing through `write_log`. The record target is the category.
pub struct UnifiedLogger;

impl Log for UnifiedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_log(
            level_code(record.level()),
            record.target(),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {
        if let Ok(mut guard) = LOG_FILE.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::warn!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        ::log::error!(target: $cat, $($arg)*)
    };
}

pub use log_debug;
pub use log_error;
pub use log_info;
pub use log_warn;
