//! Completion providers
//!
//! A [`CompletionProvider`] turns a transcript plus a tool catalog into one
//! assistant turn.
//!
//! ## Architecture
//!
//! [`GenaiProvider`] uses the `genai` crate, which handles:
//! - Streaming SSE parsing
//! - Provider-specific protocols (OpenAI, Anthropic, Gemini, etc.)
//! - Tool calling
//!
//! The streamed text chunks and captured tool calls are collected into a
//! single [`Turn`](crate::types::Turn).
//!
//! The [`ScriptedProvider`] is kept for testing purposes.

mod traits;
mod error;
mod genai_adapter;
mod genai_provider;
mod mock;

pub use traits::{CompletionProvider, ProviderModelConfig, DEFAULT_MAX_TOKENS};
pub use error::{ProviderError, ProviderResult};

pub use genai_provider::GenaiProvider;

pub use mock::{RecordedCall, ScriptStep, ScriptedProvider};
