//! Scripted provider for testing
//!
//! Replays predetermined turns without network dependencies and records every
//! request it receives, so engine tests can assert on the transcript and the
//! catalog the model was shown.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

use super::error::{ProviderError, ProviderResult};
use super::traits::CompletionProvider;
use crate::logging::Logger;
use crate::types::{CancellationToken, ContentUnit, ToolCall, ToolSpec, Turn};

/// One scripted response
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Return this turn
    Reply(Turn),
    /// Fail the call with this message
    Fail(String),
}

/// What the provider saw on one call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub transcript: Vec<Turn>,
    pub tools: Vec<ToolSpec>,
}

impl RecordedCall {
    /// Names of the tools offered on this call
    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }
}

/// Provider replaying a fixed script
pub struct ScriptedProvider {
    script: Mutex<VecDeque<ScriptStep>>,
    calls: Mutex<Vec<RecordedCall>>,
    logger: Arc<dyn Logger>,
}

impl ScriptedProvider {
    /// Create a provider with an empty script
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Queue a turn
    pub fn then_reply(self, turn: Turn) -> Self {
        self.script.lock().push_back(ScriptStep::Reply(turn));
        self
    }

    /// Queue a plain text turn
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then_reply(Turn::assistant(vec![ContentUnit::text(text)]))
    }

    /// Queue a turn made of tool requests
    pub fn then_tool_calls(self, calls: Vec<ToolCall>) -> Self {
        self.then_reply(Turn::assistant(calls.into_iter().map(ContentUnit::from).collect()))
    }

    /// Queue a failure
    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.script.lock().push_back(ScriptStep::Fail(message.into()));
        self
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Every recorded call, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Steps not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(
        &self,
        transcript: &[Turn],
        tools: &[ToolSpec],
        cancel: &CancellationToken,
    ) -> ProviderResult<Turn> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }

        self.calls.lock().push(RecordedCall {
            transcript: transcript.to_vec(),
            tools: tools.to_vec(),
        });

        let step = self.script.lock().pop_front();
        self.logger.debug(&format!(
            "[ScriptedProvider] call {} with {} turns, {} tools",
            self.call_count(),
            transcript.len(),
            tools.len()
        ));

        match step {
            Some(ScriptStep::Reply(turn)) => Ok(turn),
            Some(ScriptStep::Fail(message)) => Err(ProviderError::Scripted(message)),
            None => Err(ProviderError::Scripted("script exhausted".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn provider() -> ScriptedProvider {
        ScriptedProvider::new(Arc::new(NoOpLogger::new()))
    }

    #[tokio::test]
    async fn test_replays_in_order() {
        let provider = provider()
            .then_tool_calls(vec![ToolCall::new("call_1", "echo", json!({ "text": "hi" }))])
            .then_text("done");
        let cancel = CancellationToken::new();
        let tools = vec![ToolSpec::new("echo", "Echo text")];

        let first = provider.chat(&[Turn::user("go")], &tools, &cancel).await.unwrap();
        assert!(first.has_tool_requests());

        let second = provider.chat(&[Turn::user("go")], &[], &cancel).await.unwrap();
        assert_eq!(second.text(), "done");

        let calls = provider.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].tool_names(), vec!["echo"]);
        assert!(calls[1].tools.is_empty());
        assert_eq!(provider.remaining(), 0);
    }

    #[tokio::test]
    async fn test_failure_and_exhaustion() {
        let provider = provider().then_fail("overloaded");
        let cancel = CancellationToken::new();

        let err = provider.chat(&[Turn::user("a")], &[], &cancel).await.unwrap_err();
        assert!(err.to_string().contains("overloaded"));

        let err = provider.chat(&[Turn::user("a")], &[], &cancel).await.unwrap_err();
        assert!(err.to_string().contains("script exhausted"));
    }

    #[tokio::test]
    async fn test_cancelled() {
        let provider = provider().then_text("never");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = provider.chat(&[Turn::user("a")], &[], &cancel).await.unwrap_err();
        assert!(matches!(err, ProviderError::Cancelled));
        assert_eq!(provider.call_count(), 0);
        assert_eq!(provider.remaining(), 1);
    }
}
