//! In-process fakes for driving ToolServer and the manager in tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use super::connection::{CallOutput, ServerConnection, ServerLauncher, ToolContent};
use crate::config::ServerConfig;
use crate::mcp::{McpError, McpResult};
use crate::types::ToolSpec;

/// Scripted behaviour for one fake server
#[derive(Clone, Default)]
pub(crate) struct FakeServer {
    pub tools: Vec<ToolSpec>,
    pub fail_launch: bool,
    pub fail_list: bool,
    pub fail_close: bool,
    /// When set, launch waits for a `notify_one` before completing
    pub launch_gate: Option<Arc<Notify>>,
}

impl FakeServer {
    pub fn with_tools(names: &[&str]) -> Self {
        Self {
            tools: names
                .iter()
                .map(|n| {
                    ToolSpec::new(*n, format!("{n} tool")).with_schema(json!({
                        "type": "object",
                        "properties": { "text": { "type": "string" } }
                    }))
                })
                .collect(),
            ..Default::default()
        }
    }
}

/// Counters shared by every connection a launcher hands out
#[derive(Default)]
pub(crate) struct FakeStats {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub drops: AtomicUsize,
}

pub(crate) struct FakeLauncher {
    servers: HashMap<String, FakeServer>,
    pub stats: Arc<FakeStats>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self {
            servers: HashMap::new(),
            stats: Arc::new(FakeStats::default()),
        }
    }

    pub fn with_server(mut self, name: &str, server: FakeServer) -> Self {
        self.servers.insert(name.to_string(), server);
        self
    }
}

#[async_trait]
impl ServerLauncher for FakeLauncher {
    async fn launch(&self, name: &str, config: &ServerConfig) -> McpResult<Arc<dyn ServerConnection>> {
        let server = self.servers.get(name).cloned().unwrap_or_default();
        if let Some(gate) = &server.launch_gate {
            gate.notified().await;
        }
        if server.fail_launch {
            return Err(McpError::Spawn {
                command: config.command.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakeConnection {
            server,
            closed: AtomicBool::new(false),
            stats: Arc::clone(&self.stats),
        }))
    }
}

pub(crate) struct FakeConnection {
    server: FakeServer,
    closed: AtomicBool,
    stats: Arc<FakeStats>,
}

#[async_trait]
impl ServerConnection for FakeConnection {
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>> {
        if self.server.fail_list {
            return Err(McpError::Protocol("tools/list rejected".to_string()));
        }
        Ok(self.server.tools.clone())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallOutput> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(McpError::Closed);
        }
        let output = match name {
            "echo" => CallOutput::text(arguments["text"].as_str().unwrap_or_default()),
            "fail" => CallOutput {
                content: vec![ToolContent::Text("boom".to_string())],
                is_error: true,
            },
            "image" => CallOutput {
                content: vec![ToolContent::Other],
                is_error: false,
            },
            "hang" => std::future::pending::<CallOutput>().await,
            other => CallOutput::text(format!("{other} ok")),
        };
        Ok(output)
    }

    async fn close(&self) -> McpResult<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            panic!("connection closed twice");
        }
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
        if self.server.fail_close {
            return Err(McpError::Protocol("close failed".to_string()));
        }
        Ok(())
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.stats.drops.fetch_add(1, Ordering::SeqCst);
    }
}
