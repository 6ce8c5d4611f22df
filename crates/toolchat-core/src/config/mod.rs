//! Tool server configuration
//!
//! The configuration document maps server names to launch commands:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "echo": { "command": "echo-server", "args": ["--stdio"], "env": { "DEBUG": "1" } }
//!   }
//! }
//! ```
//!
//! JSON is the default; files ending in `.yaml`/`.yml` are read as YAML.

mod error;
mod file;

pub use error::{ConfigError, ConfigResult};
pub use file::{load_config, ServerConfig, ToolServersConfig, DEFAULT_CALL_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT};
