//! Configuration errors

use std::path::PathBuf;

/// Errors that can occur while loading configuration
///
/// A missing or empty file is not an error; it yields an empty server set.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid server '{name}': {message}")]
    InvalidServer { name: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
