//! Seams between a ToolServer and the protocol client behind it

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::error::ServerError;
use crate::config::ServerConfig;
use crate::mcp::McpResult;
use crate::types::ToolSpec;

/// One content unit of a tool call response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolContent {
    Text(String),
    /// Images, resources and anything else without a text form
    Other,
}

/// Raw response to a tool call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallOutput {
    pub content: Vec<ToolContent>,
    pub is_error: bool,
}

impl CallOutput {
    /// Build a successful text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text(text.into())],
            is_error: false,
        }
    }

    /// Reduce the response to its effective text output
    ///
    /// Text units are joined with newlines and other content is ignored.
    /// An error-flagged response becomes `ToolFailed` with the server's text,
    /// and a response without any text is `EmptyResponse`.
    pub fn into_text(self) -> Result<String, ServerError> {
        let texts: Vec<String> = self
            .content
            .into_iter()
            .filter_map(|c| match c {
                ToolContent::Text(t) => Some(t),
                ToolContent::Other => None,
            })
            .collect();

        if self.is_error {
            let message = if texts.is_empty() {
                "tool reported an error".to_string()
            } else {
                texts.join("\n")
            };
            return Err(ServerError::ToolFailed(message));
        }

        if texts.is_empty() {
            return Err(ServerError::EmptyResponse);
        }

        Ok(texts.join("\n"))
    }
}

/// A live, initialized connection to one tool server
///
/// Only the owning `ToolServer` holds one of these.
#[async_trait]
pub trait ServerConnection: Send + Sync {
    /// Fetch the server's tool catalog
    async fn list_tools(&self) -> McpResult<Vec<ToolSpec>>;

    /// Run one tool
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<CallOutput>;

    /// Terminate the server and release the connection
    async fn close(&self) -> McpResult<()>;
}

/// Spawns a server and completes the initialize handshake
#[async_trait]
pub trait ServerLauncher: Send + Sync {
    async fn launch(&self, name: &str, config: &ServerConfig) -> McpResult<Arc<dyn ServerConnection>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_units_are_joined() {
        let output = CallOutput {
            content: vec![
                ToolContent::Text("line one".into()),
                ToolContent::Other,
                ToolContent::Text("line two".into()),
            ],
            is_error: false,
        };
        assert_eq!(output.into_text().unwrap(), "line one\nline two");
    }

    #[test]
    fn test_error_flag_carries_message() {
        let output = CallOutput {
            content: vec![ToolContent::Text("no such file".into())],
            is_error: true,
        };
        let err = output.into_text().unwrap_err();
        assert!(matches!(err, ServerError::ToolFailed(ref m) if m == "no such file"));
    }

    #[test]
    fn test_non_text_only_is_empty_response() {
        let output = CallOutput {
            content: vec![ToolContent::Other],
            is_error: false,
        };
        assert!(matches!(output.into_text(), Err(ServerError::EmptyResponse)));
        assert!(matches!(CallOutput::default().into_text(), Err(ServerError::EmptyResponse)));
    }
}
