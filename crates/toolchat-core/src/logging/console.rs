//! Console logger implementation

use super::traits::{LogLevel, Logger};

/// Environment variable selecting the minimum console log level
pub const LOG_LEVEL_ENV: &str = "TOOLCHAT_LOG_LEVEL";

/// A logger that writes to stderr
///
/// Stdout is left to the conversation itself, so every level goes to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix, honouring `TOOLCHAT_LOG_LEVEL`
    pub fn new() -> Self {
        let min_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .and_then(|v| LogLevel::parse(&v))
            .unwrap_or(LogLevel::Warn);
        Self {
            prefix: "[toolchat]".to_string(),
            min_level,
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Override the minimum level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        if self.enabled(level) {
            eprintln!("{} {}: {}", self.prefix, level, message);
        }
    }
}
