//! One configured tool server and its lifecycle

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::Mutex;

use super::connection::{ServerConnection, ServerLauncher};
use super::error::{ServerError, ServerResult};
use crate::config::{ServerConfig, ToolServersConfig, DEFAULT_CALL_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT};
use crate::logging::Logger;
use crate::types::{CancellationToken, ToolSpec};

/// Lifecycle status of a tool server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Stopped,
    Starting,
    Running,
    Failed,
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerStatus::Stopped => write!(f, "stopped"),
            ServerStatus::Starting => write!(f, "starting"),
            ServerStatus::Running => write!(f, "running"),
            ServerStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Time bounds applied to server round trips
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerTimeouts {
    /// Spawn, initialize and the first tools/list together
    pub handshake: Duration,
    /// A single tools/call
    pub call: Duration,
}

impl Default for ServerTimeouts {
    fn default() -> Self {
        Self {
            handshake: DEFAULT_HANDSHAKE_TIMEOUT,
            call: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl From<&ToolServersConfig> for ServerTimeouts {
    fn from(config: &ToolServersConfig) -> Self {
        Self {
            handshake: config.handshake_timeout(),
            call: config.call_timeout(),
        }
    }
}

/// Mutable per-server state, read without waiting on transitions
struct ServerState {
    status: ServerStatus,
    connection: Option<Arc<dyn ServerConnection>>,
    /// Valid only while Running
    tools: Vec<ToolSpec>,
    last_error: Option<String>,
}

/// A configured tool server
///
/// `start` and `stop` are serialized by an async transition lock, so two
/// handshakes never race for the same server. Status and catalog live behind
/// a separate synchronous lock that is only held for short copies, which
/// keeps catalog reads from waiting on a slow start.
pub struct ToolServer {
    name: String,
    config: ServerConfig,
    launcher: Arc<dyn ServerLauncher>,
    timeouts: ServerTimeouts,
    state: RwLock<ServerState>,
    transition: Mutex<()>,
    logger: Arc<dyn Logger>,
}

/// Moves a server out of `Starting` if the start future is dropped midway
struct StartingGuard<'a> {
    server: &'a ToolServer,
    armed: bool,
}

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.server.state.write();
        if state.status == ServerStatus::Starting {
            state.status = ServerStatus::Failed;
            state.last_error = Some("start was interrupted".to_string());
        }
    }
}

impl ToolServer {
    pub fn new(
        name: impl Into<String>,
        config: ServerConfig,
        launcher: Arc<dyn ServerLauncher>,
        timeouts: ServerTimeouts,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            launcher,
            timeouts,
            state: RwLock::new(ServerState {
                status: ServerStatus::Stopped,
                connection: None,
                tools: Vec::new(),
                last_error: None,
            }),
            transition: Mutex::new(()),
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn status(&self) -> ServerStatus {
        self.state.read().status
    }

    /// Reason for the most recent failed start, if any
    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Cached catalog; empty unless the server is Running
    pub fn tools(&self) -> Vec<ToolSpec> {
        let state = self.state.read();
        if state.status == ServerStatus::Running {
            state.tools.clone()
        } else {
            Vec::new()
        }
    }

    /// Whether the server is Running and exposes `tool`
    pub fn has_tool(&self, tool: &str) -> bool {
        let state = self.state.read();
        state.status == ServerStatus::Running && state.tools.iter().any(|t| t.name == tool)
    }

    /// Launch the server, handshake and cache its catalog
    ///
    /// Already running is a no-op. A Failed server is reset to Stopped first.
    /// On failure everything acquired is released and the server is left Failed.
    pub async fn start(&self, cancel: &CancellationToken) -> ServerResult<()> {
        let _transition = self.transition.lock().await;

        {
            let mut state = self.state.write();
            match state.status {
                ServerStatus::Running => return Ok(()),
                ServerStatus::Failed => {
                    state.status = ServerStatus::Stopped;
                    state.last_error = None;
                }
                ServerStatus::Stopped | ServerStatus::Starting => {}
            }
            state.status = ServerStatus::Starting;
        }
        let mut guard = StartingGuard { server: self, armed: true };

        let outcome = self.connect(cancel).await;

        let mut state = self.state.write();
        guard.armed = false;
        match outcome {
            Ok((connection, tools)) => {
                let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
                self.logger.info(&format!(
                    "[ToolServer] Initialized '{}' with tools: {:?}",
                    self.name, names
                ));
                state.status = ServerStatus::Running;
                state.connection = Some(connection);
                state.tools = tools;
                state.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.logger.error(&format!("[ToolServer] Failed to start '{}': {}", self.name, e));
                state.status = ServerStatus::Failed;
                state.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Spawn + initialize + tools/list, bounded by the handshake timeout
    async fn connect(
        &self,
        cancel: &CancellationToken,
    ) -> ServerResult<(Arc<dyn ServerConnection>, Vec<ToolSpec>)> {
        let handshake = async {
            let connection = match self.launcher.launch(&self.name, &self.config).await {
                Ok(connection) => connection,
                Err(source) => {
                    return Err(ServerError::Start {
                        server: self.name.clone(),
                        source,
                    })
                }
            };

            match connection.list_tools().await {
                Ok(tools) => Ok((connection, tools)),
                Err(source) => {
                    if let Err(e) = connection.close().await {
                        self.logger.warn(&format!(
                            "[ToolServer] Cleanup of '{}' after failed discovery: {}",
                            self.name, e
                        ));
                    }
                    Err(ServerError::Start {
                        server: self.name.clone(),
                        source,
                    })
                }
            }
        };

        // Dropping the handshake future drops any half-open connection with it
        match cancel
            .run_until_cancelled(tokio::time::timeout(self.timeouts.handshake, handshake))
            .await
        {
            None => Err(ServerError::Cancelled),
            Some(Err(_elapsed)) => Err(ServerError::StartTimeout {
                server: self.name.clone(),
                timeout: self.timeouts.handshake,
            }),
            Some(Ok(result)) => result,
        }
    }

    /// Terminate the server
    ///
    /// Idempotent: stopping a Stopped server succeeds without doing anything.
    /// The connection is detached before closing, so it is released exactly
    /// once even when the close itself reports an error.
    pub async fn stop(&self) -> ServerResult<()> {
        let _transition = self.transition.lock().await;

        let connection = {
            let mut state = self.state.write();
            state.status = ServerStatus::Stopped;
            state.tools.clear();
            state.connection.take()
        };

        let Some(connection) = connection else {
            return Ok(());
        };

        self.logger.info(&format!("[ToolServer] Stopping '{}'", self.name));
        connection.close().await.map_err(|source| ServerError::Stop {
            server: self.name.clone(),
            source,
        })
    }

    /// Call one of this server's tools and return its text output
    pub async fn invoke(&self, tool: &str, input: Value, cancel: &CancellationToken) -> ServerResult<String> {
        let connection = {
            let state = self.state.read();
            match (&state.status, &state.connection) {
                (ServerStatus::Running, Some(connection)) => Arc::clone(connection),
                _ => return Err(ServerError::NotRunning(self.name.clone())),
            }
        };

        let call = connection.call_tool(tool, input);
        let output = match cancel
            .run_until_cancelled(tokio::time::timeout(self.timeouts.call, call))
            .await
        {
            None => return Err(ServerError::Cancelled),
            Some(Err(_elapsed)) => {
                return Err(ServerError::CallTimeout {
                    tool: tool.to_string(),
                    timeout: self.timeouts.call,
                })
            }
            Some(Ok(result)) => result.map_err(|source| ServerError::Call {
                tool: tool.to_string(),
                source,
            })?,
        };

        output.into_text()
    }
}
