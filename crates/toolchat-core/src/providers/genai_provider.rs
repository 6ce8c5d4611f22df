//! GenaiProvider - completion provider using the genai crate
//!
//! The model string picks the adapter (`claude-*` is Anthropic, `gpt-*` is
//! OpenAI, and so on). A `provider/` prefix is accepted and stripped.

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent, ToolCall as GenaiToolCall};

use crate::logging::Logger;
use crate::types::{CancellationToken, ContentUnit, ToolSpec, Turn};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_tool_call, to_genai_messages, to_genai_options, to_genai_tools,
};
use super::traits::{CompletionProvider, ProviderModelConfig};

/// Provider backed by genai for all supported LLM APIs
pub struct GenaiProvider {
    config: ProviderModelConfig,
    client: genai::Client,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    /// Create a new GenaiProvider
    pub fn new(config: ProviderModelConfig, logger: Arc<dyn Logger>) -> Self {
        let client = create_client(&config);
        Self {
            config,
            client,
            logger,
        }
    }

    /// The configured model string
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Extract provider ID from a model string (e.g., "openai/gpt-4" -> "openai")
    pub fn extract_provider(model: &str) -> Option<&str> {
        model.split_once('/').map(|(provider, _)| provider)
    }

    /// Extract model name from a model string (e.g., "openai/gpt-4" -> "gpt-4")
    pub fn extract_model_name(model: &str) -> &str {
        model.split_once('/').map(|(_, name)| name).unwrap_or(model)
    }

    /// Drive the stream to completion and assemble the produced turn
    async fn collect_turn(&self, request: ChatRequest) -> ProviderResult<Turn> {
        let model_name = Self::extract_model_name(&self.config.model);
        let options = to_genai_options(&self.config);

        self.logger.info(&format!(
            "[GenaiProvider] chat: model={}, messages={}, tools={}",
            model_name,
            request.messages.len(),
            request.tools.as_ref().map(Vec::len).unwrap_or(0)
        ));

        let chat_stream = self
            .client
            .exec_chat_stream(model_name, request, Some(&options))
            .await
            .map_err(|e| ProviderError::request(self.name(), e))?;

        let mut assembler = TurnAssembler::default();
        let mut captured: Option<Vec<GenaiToolCall>> = None;
        let mut ended = false;

        let mut stream = chat_stream.stream;
        while let Some(event) = stream.next().await {
            let event = event.map_err(|e| {
                self.logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                ProviderError::request(self.name(), e)
            })?;

            match event {
                ChatStreamEvent::Start => {
                    self.logger.debug("[GenaiProvider] Stream event: Start");
                }
                ChatStreamEvent::Chunk(chunk) => {
                    self.logger.debug(&format!(
                        "[GenaiProvider] Stream event: Chunk ({} chars)",
                        chunk.content.len()
                    ));
                    assembler.push_text(&chunk.content);
                }
                ChatStreamEvent::ToolCallChunk(chunk) => {
                    self.logger.debug("[GenaiProvider] Stream event: ToolCallChunk");
                    assembler.push_call(chunk.tool_call);
                }
                ChatStreamEvent::End(end) => {
                    self.logger.info("[GenaiProvider] Stream event: End");
                    captured = end
                        .captured_tool_calls()
                        .map(|calls| calls.into_iter().cloned().collect());
                    ended = true;
                }
                _ => {}
            }
        }

        if !ended {
            return Err(ProviderError::StreamEnded);
        }

        let turn = assembler.finish(captured.unwrap_or_default());
        if turn.units.is_empty() {
            self.logger.debug("[GenaiProvider] Response had no text and no tool calls");
        }
        Ok(turn)
    }
}

enum StreamPart {
    Text(String),
    /// Call id; the latest version of the call lives in `TurnAssembler::calls`
    Call(String),
}

/// Builds a produced turn from stream events in arrival order
#[derive(Default)]
struct TurnAssembler {
    parts: Vec<StreamPart>,
    calls: HashMap<String, GenaiToolCall>,
}

impl TurnAssembler {
    fn push_text(&mut self, chunk: &str) {
        if chunk.is_empty() {
            return;
        }
        match self.parts.last_mut() {
            Some(StreamPart::Text(text)) => text.push_str(chunk),
            _ => self.parts.push(StreamPart::Text(chunk.to_string())),
        }
    }

    /// Record a call; a later version with the same id replaces the earlier
    /// one but keeps its position
    fn push_call(&mut self, call: GenaiToolCall) {
        if !self.calls.contains_key(&call.call_id) {
            self.parts.push(StreamPart::Call(call.call_id.clone()));
        }
        self.calls.insert(call.call_id.clone(), call);
    }

    /// Captured calls carry the complete arguments. Calls never seen as
    /// chunks go after everything streamed.
    fn finish(mut self, captured: Vec<GenaiToolCall>) -> Turn {
        for call in captured {
            self.push_call(call);
        }
        let Self { parts, calls } = self;
        let units = parts
            .into_iter()
            .filter_map(|part| match part {
                StreamPart::Text(text) => Some(ContentUnit::text(text)),
                StreamPart::Call(id) => calls.get(&id).map(from_genai_tool_call),
            })
            .collect();
        Turn::assistant(units)
    }
}

#[async_trait]
impl CompletionProvider for GenaiProvider {
    fn name(&self) -> &str {
        Self::extract_provider(&self.config.model).unwrap_or("genai")
    }

    async fn chat(
        &self,
        transcript: &[Turn],
        tools: &[ToolSpec],
        cancel: &CancellationToken,
    ) -> ProviderResult<Turn> {
        let mut request = ChatRequest::new(to_genai_messages(transcript));
        if !tools.is_empty() {
            request = request.with_tools(to_genai_tools(tools));
        }

        match cancel.run_until_cancelled(self.collect_turn(request)).await {
            Some(result) => result,
            None => {
                self.logger.info("[GenaiProvider] Request cancelled");
                Err(ProviderError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn genai_call(id: &str, arguments: serde_json::Value) -> GenaiToolCall {
        GenaiToolCall {
            call_id: id.to_string(),
            fn_name: "echo".to_string(),
            fn_arguments: arguments,
            thought_signatures: None,
        }
    }

    #[test]
    fn test_assembler_keeps_stream_order() {
        let mut assembler = TurnAssembler::default();
        assembler.push_text("Looking ");
        assembler.push_text("it up.");
        assembler.push_call(genai_call("c1", json!("{\"text\":")));
        assembler.push_text("Then this.");
        assembler.push_call(genai_call("c2", json!({ "text": "two" })));

        let turn = assembler.finish(vec![
            genai_call("c1", json!({ "text": "one" })),
            genai_call("c2", json!({ "text": "two" })),
        ]);

        assert_eq!(
            turn.units,
            vec![
                ContentUnit::text("Looking it up."),
                ContentUnit::tool_request("c1", "echo", json!({ "text": "one" })),
                ContentUnit::text("Then this."),
                ContentUnit::tool_request("c2", "echo", json!({ "text": "two" })),
            ]
        );
    }

    #[test]
    fn test_assembler_appends_captured_only_calls() {
        let mut assembler = TurnAssembler::default();
        assembler.push_text("Sure.");

        let turn = assembler.finish(vec![genai_call("c1", json!({}))]);

        assert_eq!(
            turn.units,
            vec![
                ContentUnit::text("Sure."),
                ContentUnit::tool_request("c1", "echo", json!({})),
            ]
        );
    }

    #[test]
    fn test_assembler_empty_response() {
        let mut assembler = TurnAssembler::default();
        assembler.push_text("");

        let turn = assembler.finish(Vec::new());

        assert_eq!(turn, Turn::assistant(vec![]));
    }

    #[test]
    fn test_extract_provider() {
        assert_eq!(GenaiProvider::extract_provider("openai/gpt-4"), Some("openai"));
        assert_eq!(
            GenaiProvider::extract_provider("anthropic/claude-3"),
            Some("anthropic")
        );
        assert_eq!(GenaiProvider::extract_provider("gpt-4"), None);
    }

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiProvider::extract_model_name("openai/gpt-4"), "gpt-4");
        assert_eq!(
            GenaiProvider::extract_model_name("anthropic/claude-3-opus"),
            "claude-3-opus"
        );
        assert_eq!(GenaiProvider::extract_model_name("gpt-4"), "gpt-4");
    }

    #[test]
    fn test_name_from_model() {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        let provider = GenaiProvider::new(
            ProviderModelConfig::new("anthropic/claude-3-7-sonnet-latest"),
            Arc::clone(&logger),
        );
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.model(), "anthropic/claude-3-7-sonnet-latest");

        let provider = GenaiProvider::new(ProviderModelConfig::new("claude-3-7-sonnet-latest"), logger);
        assert_eq!(provider.name(), "genai");
    }

    #[tokio::test]
    async fn test_cancelled_before_request() {
        let provider = GenaiProvider::new(
            ProviderModelConfig::new("claude-3-7-sonnet-latest").with_api_key("test-key"),
            Arc::new(NoOpLogger::new()),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = provider.chat(&[Turn::user("hi")], &[], &cancel).await;
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }
}
