//! File-based tool server configuration (JSON or YAML)

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use crate::logging::Logger;

/// Default bound on the initialize handshake plus the first tools/list
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single tools/call round trip
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Launch description for one tool server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Executable to spawn
    pub command: String,
    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment overrides for the child process
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServerConfig {
    /// Create a config for a command with no arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Set the argument list
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add an environment override
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// The whole configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ToolServersConfig {
    /// Configured servers, keyed by logical name
    #[serde(default)]
    pub mcp_servers: BTreeMap<String, ServerConfig>,

    /// Seconds allowed for spawn + initialize + tools/list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handshake_timeout_secs: Option<u64>,

    /// Seconds allowed for one tool call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
}

impl ToolServersConfig {
    /// Add a server (builder style)
    pub fn with_server(mut self, name: impl Into<String>, config: ServerConfig) -> Self {
        self.mcp_servers.insert(name.into(), config);
        self
    }

    /// Handshake timeout, falling back to the default
    pub fn handshake_timeout(&self) -> Duration {
        self.handshake_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HANDSHAKE_TIMEOUT)
    }

    /// Tool call timeout, falling back to the default
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CALL_TIMEOUT)
    }

    /// Check every server has something to launch
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, server) in &self.mcp_servers {
            if server.command.trim().is_empty() {
                return Err(ConfigError::InvalidServer {
                    name: name.clone(),
                    message: "command must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parse a document, choosing YAML or JSON by file extension
    pub fn parse(path: &Path, content: &str) -> ConfigResult<Self> {
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let parsed = if is_yaml {
            serde_yaml::from_str::<Option<Self>>(content)
                .map(Option::unwrap_or_default)
                .map_err(|e| e.to_string())
        } else {
            serde_json::from_str::<Self>(content).map_err(|e| e.to_string())
        };

        let config = parsed.map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Load the configuration document at `path`
///
/// A missing or empty file yields an empty configuration, so the session
/// proceeds with local tools only.
pub fn load_config(path: impl AsRef<Path>, logger: &Arc<dyn Logger>) -> ConfigResult<ToolServersConfig> {
    let path = path.as_ref();

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            logger.warn(&format!(
                "[Config] {} not found: starting with no servers configured",
                path.display()
            ));
            return Ok(ToolServersConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if content.trim().is_empty() {
        logger.warn(&format!(
            "[Config] {} is empty: starting with no servers configured",
            path.display()
        ));
        return Ok(ToolServersConfig::default());
    }

    let config = ToolServersConfig::parse(path, &content)?;
    logger.info(&format!(
        "[Config] Loaded {} server(s) from {}",
        config.mcp_servers.len(),
        path.display()
    ));
    Ok(config)
}
