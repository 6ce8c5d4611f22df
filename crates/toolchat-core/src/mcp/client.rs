//! MCP client using the official rmcp SDK
//!
//! Spawns a tool server and drives it over the child's stdin/stdout.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::{
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, RawContent, Tool},
    service::{Peer, RunningService},
    transport::TokioChildProcess,
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ServerConfig;
use crate::logging::Logger;
use crate::servers::{CallOutput, ServerConnection, ServerLauncher, ToolContent};
use crate::types::ToolSpec;

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Connection closed")]
    Closed,
}

pub type McpResult<T> = Result<T, McpError>;

/// MCP client connected to one tool server process
///
/// The running service owns the transport and, through it, the child
/// process. Dropping or closing the client terminates the child.
pub struct McpClient {
    /// Server name, for log messages
    name: String,
    /// Request handle used for list/call
    peer: Peer<RoleClient>,
    /// The underlying rmcp running service, taken on close
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    /// Logger
    logger: Arc<dyn Logger>,
}

impl McpClient {
    /// Identity announced during the initialize handshake
    fn client_info() -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "toolchat".to_string(),
                title: Some("toolchat".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        }
    }

    /// Spawn the configured command and perform the initialize handshake
    ///
    /// If the handshake fails the transport is dropped, which kills the
    /// child before this returns.
    pub async fn connect_stdio(
        name: &str,
        config: &ServerConfig,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!(
            "[McpClient] Starting '{}' with command: {} {:?}",
            name, config.command, config.args
        ));

        let mut command = Command::new(&config.command);
        command.args(&config.args).envs(&config.env).kill_on_drop(true);

        let transport = TokioChildProcess::new(command).map_err(|source| McpError::Spawn {
            command: config.command.clone(),
            source,
        })?;

        let service = Self::client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        if let Some(info) = service.peer_info() {
            logger.info(&format!(
                "[McpClient] '{}' initialized: {} {}",
                name, info.server_info.name, info.server_info.version
            ));
        }

        Ok(Self {
            name: name.to_string(),
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
            logger,
        })
    }

    fn ensure_open(&self) -> McpResult<()> {
        if self.service.lock().is_none() {
            return Err(McpError::Closed);
        }
        Ok(())
    }

    /// List all available tools
    pub async fn list_tools(&self) -> McpResult<Vec<Tool>> {
        self.ensure_open()?;
        let result = self
            .peer
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] '{}' listed {} tools",
            self.name,
            result.tools.len()
        ));

        Ok(result.tools)
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.ensure_open()?;
        self.logger.debug(&format!("[McpClient] '{}' calling tool: {}", self.name, name));

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: arguments.as_object().cloned(),
            task: None,
        };

        self.peer
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Close the connection and terminate the server process
    ///
    /// Closing twice is a no-op.
    pub async fn close(&self) -> McpResult<()> {
        let Some(service) = self.service.lock().take() else {
            return Ok(());
        };
        self.logger.info(&format!("[McpClient] Closing '{}'", self.name));
        service
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl From<Tool> for ToolSpec {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
            // input_schema is Arc<JsonObject>, convert to Value
            input_schema: serde_json::to_value(tool.input_schema.as_ref()).unwrap_or_default(),
        }
    }
}

impl From<CallToolResult> for CallOutput {
    fn from(result: CallToolResult) -> Self {
        // Content is Annotated<RawContent>, we access .raw to get RawContent
        let content = result
            .content
            .into_iter()
            .map(|c| match c.raw {
                RawContent::Text(t) => ToolContent::Text(t.text),
                _ => ToolContent::Other,
            })
            .collect();

        Self {
            content,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

#[async_trait]
impl ServerConnection for McpClient {
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>> {
        let tools = McpClient::list_tools(self).await?;
        Ok(tools.into_iter().map(ToolSpec::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallOutput> {
        let result = McpClient::call_tool(self, name, arguments).await?;
        Ok(result.into())
    }

    async fn close(&self) -> McpResult<()> {
        McpClient::close(self).await
    }
}

/// Launches tool servers as child processes speaking MCP over stdio
pub struct StdioLauncher {
    logger: Arc<dyn Logger>,
}

impl StdioLauncher {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }
}

#[async_trait]
impl ServerLauncher for StdioLauncher {
    async fn launch(&self, name: &str, config: &ServerConfig) -> McpResult<Arc<dyn ServerConnection>> {
        let client = McpClient::connect_stdio(name, config, Arc::clone(&self.logger)).await?;
        Ok(Arc::new(client))
    }
}
