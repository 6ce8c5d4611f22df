//! Routes tool requests to their executor

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::logging::Logger;
use crate::servers::{ServerError, ToolServerManager};
use crate::tools::{ToolCatalog, ToolError, ToolOrigin};
use crate::types::{CancellationToken, ToolCall, ToolResult};

/// A tool invocation that failed but leaves the session usable
///
/// These are reported back to the model as error-flagged results.
#[derive(Error, Debug)]
pub enum ToolFailure {
    #[error("tool not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Execution(String),
}

impl From<ToolError> for ToolFailure {
    fn from(e: ToolError) -> Self {
        ToolFailure::Execution(e.to_string())
    }
}

impl From<ServerError> for ToolFailure {
    fn from(e: ServerError) -> Self {
        match e {
            ServerError::ToolNotFound(name) => ToolFailure::NotFound(name),
            other => ToolFailure::Execution(other.to_string()),
        }
    }
}

/// Runs tool requests against the catalog they were offered from
pub struct ToolDispatcher {
    manager: Arc<ToolServerManager>,
    logger: Arc<dyn Logger>,
}

impl ToolDispatcher {
    pub fn new(manager: Arc<ToolServerManager>, logger: Arc<dyn Logger>) -> Self {
        Self { manager, logger }
    }

    /// Run one request, keeping failures typed
    pub async fn try_dispatch(
        &self,
        name: &str,
        input: Value,
        catalog: &ToolCatalog,
        cancel: &CancellationToken,
    ) -> Result<String, ToolFailure> {
        let descriptor = catalog
            .get(name)
            .ok_or_else(|| ToolFailure::NotFound(name.to_string()))?;

        match &descriptor.origin {
            ToolOrigin::Local(tool) => Ok(tool.execute(input)?),
            ToolOrigin::Remote { server } => {
                Ok(self.manager.invoke_on(server, name, input, cancel).await?)
            }
        }
    }

    /// Run one request; every failure becomes an error-flagged result
    pub async fn dispatch(&self, call: ToolCall, catalog: &ToolCatalog, cancel: &CancellationToken) -> ToolResult {
        match self.try_dispatch(&call.name, call.input, catalog, cancel).await {
            Ok(output) => ToolResult::success(call.id, output),
            Err(failure) => {
                self.logger
                    .warn(&format!("[ToolDispatcher] '{}' failed: {}", call.name, failure));
                ToolResult::error(call.id, failure.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolServersConfig;
    use crate::logging::NoOpLogger;
    use crate::servers::testing::{FakeLauncher, FakeServer};
    use crate::tools::LocalToolRegistry;
    use serde_json::json;
    use tempfile::TempDir;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn echo_manager() -> Arc<ToolServerManager> {
        let config = ToolServersConfig::default().with_server("alpha", crate::config::ServerConfig::new("fake"));
        let launcher = FakeLauncher::new().with_server("alpha", FakeServer::with_tools(&["echo", "fail"]));
        let manager = ToolServerManager::new(&config, Arc::new(launcher), logger());
        let report = manager.start_all(&CancellationToken::new()).await;
        assert!(report.all_started());
        Arc::new(manager)
    }

    #[tokio::test]
    async fn test_routes_remote_tool() {
        let manager = echo_manager().await;
        let catalog = ToolCatalog::merge(&LocalToolRegistry::new(), manager.tools(), &logger());
        let dispatcher = ToolDispatcher::new(manager, logger());

        let result = dispatcher
            .dispatch(
                ToolCall::new("call_1", "echo", json!({ "text": "hi" })),
                &catalog,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result, ToolResult::success("call_1", "hi"));
    }

    #[tokio::test]
    async fn test_routes_local_tool() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "local").unwrap();

        let manager = Arc::new(ToolServerManager::empty(logger()));
        let catalog = ToolCatalog::merge(&LocalToolRegistry::with_builtin_tools(), manager.tools(), &logger());
        let dispatcher = ToolDispatcher::new(manager, logger());

        let result = dispatcher
            .dispatch(
                ToolCall::new("call_1", "read_file", json!({ "path": path.to_string_lossy() })),
                &catalog,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result, ToolResult::success("call_1", "local"));
    }

    #[tokio::test]
    async fn test_unknown_tool_is_error_result() {
        let manager = Arc::new(ToolServerManager::empty(logger()));
        let catalog = ToolCatalog::merge(&LocalToolRegistry::new(), Vec::new(), &logger());
        let dispatcher = ToolDispatcher::new(manager, logger());

        let failure = dispatcher
            .try_dispatch("nope", json!({}), &catalog, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(failure, ToolFailure::NotFound(_)));

        let result = dispatcher
            .dispatch(ToolCall::new("call_1", "nope", json!({})), &catalog, &CancellationToken::new())
            .await;
        assert_eq!(result, ToolResult::error("call_1", "tool not found: nope"));
    }

    #[tokio::test]
    async fn test_execution_errors_are_error_results() {
        let manager = echo_manager().await;
        let catalog = ToolCatalog::merge(&LocalToolRegistry::with_builtin_tools(), manager.tools(), &logger());
        let dispatcher = ToolDispatcher::new(manager, logger());
        let cancel = CancellationToken::new();

        let remote = dispatcher
            .dispatch(ToolCall::new("call_1", "fail", json!({})), &catalog, &cancel)
            .await;
        assert_eq!(remote, ToolResult::error("call_1", "boom"));

        let local = dispatcher
            .dispatch(ToolCall::new("call_2", "read_file", json!({ "path": 7 })), &catalog, &cancel)
            .await;
        assert!(local.is_error);
        assert!(local.content.starts_with("Invalid input"));
    }

    #[tokio::test]
    async fn test_stale_remote_entry() {
        let manager = echo_manager().await;
        let catalog = ToolCatalog::merge(&LocalToolRegistry::new(), manager.tools(), &logger());
        manager.stop_all().await;
        let dispatcher = ToolDispatcher::new(Arc::clone(&manager), logger());

        let result = dispatcher
            .dispatch(
                ToolCall::new("call_1", "echo", json!({ "text": "hi" })),
                &catalog,
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result, ToolResult::error("call_1", "tool not found: echo"));
    }
}
