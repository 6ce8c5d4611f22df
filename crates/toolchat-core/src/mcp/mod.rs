//! MCP (Model Context Protocol) client module
//!
//! Uses the official rmcp SDK to launch tool servers as child processes and
//! speak to them over stdio.
//!
//! # Example
//!
//! ```rust,ignore
//! use toolchat_core::config::ServerConfig;
//! use toolchat_core::mcp::McpClient;
//!
//! let config = ServerConfig::new("npx").with_args(["-y", "@modelcontextprotocol/server-everything"]);
//! let client = McpClient::connect_stdio("everything", &config, logger).await?;
//!
//! let tools = client.list_tools().await?;
//! let result = client.call_tool("echo", json!({ "message": "hi" })).await?;
//! client.close().await?;
//! ```

mod client;

pub use client::{McpClient, McpError, McpResult, StdioLauncher};
