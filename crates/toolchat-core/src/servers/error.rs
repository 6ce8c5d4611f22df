//! Tool server errors

use std::time::Duration;

use thiserror::Error;

use crate::mcp::McpError;

/// Errors from starting, stopping or calling into tool servers
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to start '{server}': {source}")]
    Start {
        server: String,
        #[source]
        source: McpError,
    },

    #[error("'{server}' did not finish starting within {timeout:?}")]
    StartTimeout { server: String, timeout: Duration },

    #[error("Failed to stop '{server}': {source}")]
    Stop {
        server: String,
        #[source]
        source: McpError,
    },

    #[error("Server '{0}' is not running")]
    NotRunning(String),

    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("Call to '{tool}' failed: {source}")]
    Call {
        tool: String,
        #[source]
        source: McpError,
    },

    #[error("Call to '{tool}' timed out after {timeout:?}")]
    CallTimeout { tool: String, timeout: Duration },

    /// The server answered with its error flag set
    #[error("{0}")]
    ToolFailed(String),

    #[error("empty tool response")]
    EmptyResponse,

    #[error("Operation cancelled")]
    Cancelled,
}

pub type ServerResult<T> = Result<T, ServerError>;
