//! Tool server manager
//!
//! Owns every configured [`ToolServer`], aggregates their catalogs and routes
//! invocations. The server set is fixed at construction.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::RwLock;
use serde_json::Value;

use super::connection::ServerLauncher;
use super::error::{ServerError, ServerResult};
use super::server::{ServerTimeouts, ToolServer};
use crate::config::ToolServersConfig;
use crate::logging::Logger;
use crate::mcp::StdioLauncher;
use crate::types::{CancellationToken, ToolSpec};

/// A tool exposed by a running server
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTool {
    /// Name of the server that owns the tool
    pub server: String,
    pub spec: ToolSpec,
}

/// Aggregate outcome of [`ToolServerManager::start_all`]
#[derive(Debug, Default)]
pub struct StartReport {
    /// Servers now Running, in name order
    pub running: Vec<String>,
    /// Servers that failed, with the reason
    pub failed: Vec<(String, ServerError)>,
}

impl StartReport {
    pub fn all_started(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Aggregate outcome of [`ToolServerManager::stop_all`]
#[derive(Debug, Default)]
pub struct StopReport {
    pub stopped: Vec<String>,
    pub failures: Vec<(String, ServerError)>,
}

impl StopReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Manager for the configured tool servers
pub struct ToolServerManager {
    /// Servers keyed by name; written once at construction
    servers: RwLock<BTreeMap<String, Arc<ToolServer>>>,
    logger: Arc<dyn Logger>,
}

impl ToolServerManager {
    /// Create a manager that launches servers with the given launcher
    pub fn new(config: &ToolServersConfig, launcher: Arc<dyn ServerLauncher>, logger: Arc<dyn Logger>) -> Self {
        let timeouts = ServerTimeouts::from(config);
        let servers = config
            .mcp_servers
            .iter()
            .map(|(name, server_config)| {
                let server = ToolServer::new(
                    name.clone(),
                    server_config.clone(),
                    Arc::clone(&launcher),
                    timeouts,
                    Arc::clone(&logger),
                );
                (name.clone(), Arc::new(server))
            })
            .collect();

        Self {
            servers: RwLock::new(servers),
            logger,
        }
    }

    /// Create a manager that spawns servers as stdio child processes
    pub fn from_config(config: &ToolServersConfig, logger: Arc<dyn Logger>) -> Self {
        let launcher: Arc<dyn ServerLauncher> = Arc::new(StdioLauncher::new(Arc::clone(&logger)));
        Self::new(config, launcher, logger)
    }

    /// Create a manager with no servers
    pub fn empty(logger: Arc<dyn Logger>) -> Self {
        Self {
            servers: RwLock::new(BTreeMap::new()),
            logger,
        }
    }

    /// Copy out the server handles so no lock is held across awaits
    fn snapshot(&self) -> Vec<Arc<ToolServer>> {
        self.servers.read().values().cloned().collect()
    }

    /// Look up a server by name
    pub fn server(&self, name: &str) -> Option<Arc<ToolServer>> {
        self.servers.read().get(name).cloned()
    }

    /// Configured server names, in order
    pub fn server_names(&self) -> Vec<String> {
        self.servers.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }

    /// Start every configured server
    ///
    /// Servers start concurrently and independently; one failure never
    /// prevents the others from starting.
    pub async fn start_all(&self, cancel: &CancellationToken) -> StartReport {
        let servers = self.snapshot();
        let outcomes = join_all(servers.iter().map(|server| async move {
            (server.name().to_string(), server.start(cancel).await)
        }))
        .await;

        let mut report = StartReport::default();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(()) => report.running.push(name),
                Err(e) => {
                    self.logger.warn(&format!("[ToolServerManager] '{}' unavailable: {}", name, e));
                    report.failed.push((name, e));
                }
            }
        }

        self.logger.info(&format!(
            "[ToolServerManager] {} server(s) running, {} failed",
            report.running.len(),
            report.failed.len()
        ));
        report
    }

    /// Stop every server, collecting failures without interrupting the sweep
    pub async fn stop_all(&self) -> StopReport {
        let mut report = StopReport::default();
        for server in self.snapshot() {
            let name = server.name().to_string();
            match server.stop().await {
                Ok(()) => report.stopped.push(name),
                Err(e) => {
                    self.logger.warn(&format!("[ToolServerManager] {}", e));
                    report.failures.push((name, e));
                }
            }
        }
        report
    }

    /// Catalogs of every Running server, concatenated in server-name order
    ///
    /// Never waits on a server that is starting or stopping.
    pub fn tools(&self) -> Vec<RemoteTool> {
        self.snapshot()
            .iter()
            .flat_map(|server| {
                let owner = server.name().to_string();
                server.tools().into_iter().map(move |spec| RemoteTool {
                    server: owner.clone(),
                    spec,
                })
            })
            .collect()
    }

    /// Find the running server that exposes `tool`
    ///
    /// When several do, the first in name order owns the tool.
    pub fn owner_of(&self, tool: &str) -> Option<Arc<ToolServer>> {
        self.snapshot().into_iter().find(|server| server.has_tool(tool))
    }

    /// Invoke a tool on whichever running server exposes it
    pub async fn invoke_tool(&self, tool: &str, input: Value, cancel: &CancellationToken) -> ServerResult<String> {
        let server = self
            .owner_of(tool)
            .ok_or_else(|| ServerError::ToolNotFound(tool.to_string()))?;
        server.invoke(tool, input, cancel).await
    }

    /// Invoke a tool on a named server
    ///
    /// Fails with `ToolNotFound` if the server stopped exposing the tool since
    /// the catalog was read.
    pub async fn invoke_on(
        &self,
        server: &str,
        tool: &str,
        input: Value,
        cancel: &CancellationToken,
    ) -> ServerResult<String> {
        let owner = self
            .server(server)
            .ok_or_else(|| ServerError::UnknownServer(server.to_string()))?;
        if !owner.has_tool(tool) {
            return Err(ServerError::ToolNotFound(tool.to_string()));
        }
        owner.invoke(tool, input, cancel).await
    }
}
