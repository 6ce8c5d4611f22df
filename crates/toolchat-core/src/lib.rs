//! Toolchat Core
//!
//! A terminal conversation with a language model that can call tools.
//! Tools are either local executors or remote tools exposed by MCP servers
//! launched as child processes. This crate holds everything but the terminal
//! itself, so it can be driven by the CLI or by tests.
//!
//! ## Session
//!
//! ```rust,ignore
//! use toolchat_core::{config, engine, providers, servers, tools};
//!
//! let config = config::load_config("toolchat.json", &logger)?;
//! let manager = Arc::new(servers::ToolServerManager::from_config(&config, logger.clone()));
//! let report = manager.start_all(&cancel).await;
//!
//! let provider = Arc::new(providers::GenaiProvider::new(
//!     providers::ProviderModelConfig::new("claude-3-7-sonnet-latest"),
//!     logger.clone(),
//! ));
//! let mut engine = engine::ConversationEngine::new(
//!     provider,
//!     manager.clone(),
//!     tools::LocalToolRegistry::with_builtin_tools(),
//!     logger,
//! );
//! engine.run(&mut io, &cancel).await?;
//! manager.stop_all().await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod mcp;
pub mod servers;
pub mod tools;
pub mod providers;
pub mod engine;

// Re-export commonly used types
pub use types::{CancellationToken, ContentUnit, Role, ToolCall, ToolResult, ToolSpec, Turn};

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger, SharedLogger};

pub use config::{load_config, ConfigError, ServerConfig, ToolServersConfig};

pub use mcp::{McpClient, McpError, McpResult};

pub use servers::{ServerError, ServerStatus, StartReport, StopReport, ToolServer, ToolServerManager};

pub use tools::{LocalTool, LocalToolRegistry, ToolCatalog, ToolDescriptor, ToolError, ToolOrigin};

pub use providers::{CompletionProvider, GenaiProvider, ProviderError, ProviderModelConfig, ScriptedProvider};

pub use engine::{ChatIo, Conversation, ConversationEngine, ConversationError, EngineError, ToolFailure};
