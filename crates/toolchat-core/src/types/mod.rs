//! Core types for conversations and tools
//!
//! This module contains the shared types passed between the engine,
//! the completion providers and the tool sources.

mod message;
mod tool;
mod cancellation;

pub use message::{ContentUnit, Role, Turn};
pub use tool::{ToolCall, ToolResult, ToolSpec};
pub use cancellation::CancellationToken;
