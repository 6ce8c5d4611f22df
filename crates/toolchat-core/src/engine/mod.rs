//! Conversation engine
//!
//! ```text
//!   user line ──► Conversation ──► CompletionProvider::chat(transcript, catalog)
//!                      ▲                          │
//!                      │ tool results turn        ▼ assistant turn
//!                      └──── ToolDispatcher ◄── text shown / requests run
//! ```
//!
//! The catalog is rebuilt from the local registry and the manager before
//! every provider call, so servers that start or stop mid-session are picked
//! up on the next turn.

mod conversation;
mod dispatcher;
mod io;
mod session;

pub use conversation::{Conversation, ConversationError, ConversationResult};
pub use dispatcher::{ToolDispatcher, ToolFailure};
pub use io::{ChatIo, IoEvent, ScriptedIo};
pub use session::{ConversationEngine, EngineError, EngineMode, EngineResult};
