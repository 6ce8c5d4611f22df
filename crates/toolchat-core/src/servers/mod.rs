//! Tool server lifecycle and routing
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  ToolServerManager                           │
//! │    - start_all / stop_all (per-server        │
//! │      failures isolated and reported)         │
//! │    - tools(): catalogs of Running servers    │
//! │    - invoke_tool(): route by tool name       │
//! └──────────────────────────────────────────────┘
//!           │ one per configured server
//!           ▼
//! ┌──────────────────────────────────────────────┐
//! │  ToolServer                                  │
//! │    Stopped → Starting → Running | Failed     │
//! │    owns its ServerConnection exclusively     │
//! └──────────────────────────────────────────────┘
//!           │ ServerLauncher / ServerConnection
//!           ▼
//! ┌──────────────────────────────────────────────┐
//! │  McpClient (rmcp over child stdio)           │
//! └──────────────────────────────────────────────┘
//! ```

mod connection;
mod error;
mod server;
mod manager;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{CallOutput, ServerConnection, ServerLauncher, ToolContent};
pub use error::{ServerError, ServerResult};
pub use server::{ServerStatus, ServerTimeouts, ToolServer};
pub use manager::{RemoteTool, StartReport, StopReport, ToolServerManager};
