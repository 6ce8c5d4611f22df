//! Tool management module
//!
//! Tools come from two places: in-process executors held by the
//! [`LocalToolRegistry`] and remote tools exposed by running tool servers.
//! A [`ToolCatalog`] merges both for one model call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────┐     ┌──────────────────────────┐
//! │  LocalToolRegistry   │     │  ToolServerManager       │
//! │  read_file, ...      │     │  tools() of Running      │
//! └──────────┬───────────┘     └────────────┬─────────────┘
//!            │ Local(executor)              │ Remote { server }
//!            ▼                              ▼
//!        ┌──────────────────────────────────────┐
//!        │  ToolCatalog::merge                  │
//!        │  - local wins on a name collision    │
//!        │  - first server wins between servers │
//!        └──────────────────────────────────────┘
//! ```

mod registry;
mod catalog;
pub mod builtin;

pub use registry::{LocalTool, LocalToolRegistry, ToolError, ToolOutput};
pub use catalog::{ToolCatalog, ToolDescriptor, ToolOrigin};
