//! Adapter between toolchat turns and genai types
//!
//! User turns may carry typed text or tool results; assistant turns may carry
//! text and tool calls. genai models tool results as separate tool-response
//! messages, so one user turn can expand into several genai messages.

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ContentPart as GenaiPart,
    MessageContent as GenaiContent, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver};
use genai::{Client, ModelIden};
use serde_json::Value;

use crate::types::{ContentUnit, Role, ToolCall, ToolSpec, Turn};

use super::traits::ProviderModelConfig;

/// Marks an error-flagged tool result in the text sent to the model
pub const TOOL_ERROR_PREFIX: &str = "Error: ";

// ============================================================================
// Transcript Conversion: toolchat -> genai
// ============================================================================

/// Convert one turn into the genai messages that represent it
pub fn to_genai_turn(turn: &Turn) -> Vec<GenaiMessage> {
    match turn.role {
        Role::User => turn
            .units
            .iter()
            .filter_map(|unit| match unit {
                ContentUnit::Text { text } => Some(GenaiMessage::user(text.as_str())),
                ContentUnit::ToolResult { id, output, is_error } => {
                    Some(GenaiMessage::from(GenaiToolResponse {
                        call_id: id.clone(),
                        content: tool_response_content(output, *is_error),
                    }))
                }
                ContentUnit::ToolRequest { .. } => None,
            })
            .collect(),
        // An empty produced turn has nothing to replay
        Role::Assistant if turn.units.is_empty() => Vec::new(),
        Role::Assistant => {
            let text = turn.text();
            let calls: Vec<GenaiToolCall> = turn.tool_calls().iter().map(to_genai_tool_call).collect();

            if calls.is_empty() {
                return vec![GenaiMessage::assistant(text)];
            }

            let content = if text.is_empty() {
                GenaiContent::from_tool_calls(calls)
            } else {
                let mut content = GenaiContent::from(text.as_str());
                for call in calls {
                    content.push(GenaiPart::ToolCall(call));
                }
                content
            };
            vec![GenaiMessage::assistant(content)]
        }
    }
}

/// genai tool responses have no error flag, so failures are marked in the text
fn tool_response_content(output: &str, is_error: bool) -> String {
    if is_error {
        format!("{}{}", TOOL_ERROR_PREFIX, output)
    } else {
        output.to_string()
    }
}

/// Convert a whole transcript to genai messages
pub fn to_genai_messages(transcript: &[Turn]) -> Vec<GenaiMessage> {
    transcript.iter().flat_map(to_genai_turn).collect()
}

/// Convert a toolchat ToolCall to a genai ToolCall
pub fn to_genai_tool_call(call: &ToolCall) -> GenaiToolCall {
    GenaiToolCall {
        call_id: call.id.clone(),
        fn_name: call.name.clone(),
        fn_arguments: call.input.clone(),
        thought_signatures: None,
    }
}

// ============================================================================
// Tool Conversion: toolchat -> genai
// ============================================================================

/// Convert a tool definition to a genai Tool
pub fn to_genai_tool(spec: &ToolSpec) -> GenaiTool {
    GenaiTool::new(&spec.name)
        .with_description(&spec.description)
        .with_schema(spec.input_schema.clone())
}

/// Convert a catalog to genai tools
pub fn to_genai_tools(specs: &[ToolSpec]) -> Vec<GenaiTool> {
    specs.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Options Conversion
// ============================================================================

/// Build genai ChatOptions for a model config
pub fn to_genai_options(config: &ProviderModelConfig) -> GenaiOptions {
    GenaiOptions::default()
        .with_max_tokens(config.max_tokens)
        // Capture tool calls in stream so we can return them
        .with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> toolchat
// ============================================================================

/// Decode tool arguments; some adapters hand back the raw JSON string
pub fn decode_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::Null => Value::Object(Default::default()),
        Value::String(raw) if raw.trim().is_empty() => Value::Object(Default::default()),
        Value::String(raw) => serde_json::from_str(raw).unwrap_or_else(|_| arguments.clone()),
        other => other.clone(),
    }
}

/// Convert a genai ToolCall to a request unit
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ContentUnit {
    ContentUnit::tool_request(tc.call_id.clone(), tc.fn_name.clone(), decode_arguments(&tc.fn_arguments))
}

// ============================================================================
// Client Creation
// ============================================================================

/// Create a genai Client
///
/// With an explicit key every request authenticates with it; otherwise genai
/// reads the adapter's usual environment variable (`ANTHROPIC_API_KEY`, ...).
pub fn create_client(config: &ProviderModelConfig) -> Client {
    let Some(key) = config.api_key.clone() else {
        return Client::default();
    };

    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = key.clone();
            Box::pin(async move { Ok(Some(AuthData::from_single(key))) })
        },
    );

    Client::builder().with_auth_resolver(auth_resolver).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ToolResult;
    use genai::chat::ChatRole as GenaiRole;
    use serde_json::json;

    #[test]
    fn test_user_text_turn() {
        let messages = to_genai_messages(&[Turn::user("Hello, world!")]);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].role, GenaiRole::User));
    }

    #[test]
    fn test_tool_results_expand_to_tool_messages() {
        let turn = Turn::tool_results(vec![
            ToolResult::success("call_1", "a"),
            ToolResult::error("call_2", "b"),
        ]);
        let messages = to_genai_turn(&turn);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| matches!(m.role, GenaiRole::Tool)));
    }

    #[test]
    fn test_error_results_are_marked() {
        let turn = Turn::tool_results(vec![
            ToolResult::success("call_1", "42"),
            ToolResult::error("call_2", "tool not found: nope"),
        ]);
        let messages = to_genai_turn(&turn);

        let contents: Vec<&str> = messages
            .iter()
            .flat_map(|m| m.content.tool_responses())
            .map(|r| r.content.as_str())
            .collect();
        assert_eq!(contents, vec!["42", "Error: tool not found: nope"]);
    }

    #[test]
    fn test_empty_assistant_turn_is_skipped() {
        let transcript = [
            Turn::user("hi"),
            Turn::assistant(vec![]),
            Turn::user("still there?"),
        ];
        let messages = to_genai_messages(&transcript);
        assert_eq!(messages.len(), 2);
        assert!(messages.iter().all(|m| matches!(m.role, GenaiRole::User)));
    }

    #[test]
    fn test_assistant_turn_with_calls() {
        let turn = Turn::assistant(vec![
            ContentUnit::text("Let me look."),
            ContentUnit::tool_request("call_1", "read_file", json!({ "path": "a.txt" })),
        ]);
        let messages = to_genai_turn(&turn);
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].role, GenaiRole::Assistant));
    }

    #[test]
    fn test_tool_conversion() {
        let spec = ToolSpec::new("get_weather", "Get weather for a location").with_schema(json!({
            "type": "object",
            "properties": {
                "location": { "type": "string" }
            }
        }));

        let genai_tool = to_genai_tool(&spec);
        assert_eq!(genai_tool.name, "get_weather");
    }

    #[test]
    fn test_decode_arguments() {
        assert_eq!(decode_arguments(&json!({ "a": 1 })), json!({ "a": 1 }));
        assert_eq!(decode_arguments(&json!("{\"a\":1}")), json!({ "a": 1 }));
        assert_eq!(decode_arguments(&Value::Null), json!({}));
        assert_eq!(decode_arguments(&json!("")), json!({}));
        assert_eq!(decode_arguments(&json!("not json")), json!("not json"));
    }

    #[test]
    fn test_from_genai_tool_call() {
        let tc = GenaiToolCall {
            call_id: "call_9".to_string(),
            fn_name: "list_files".to_string(),
            fn_arguments: json!("{}"),
            thought_signatures: None,
        };
        assert_eq!(
            from_genai_tool_call(&tc),
            ContentUnit::tool_request("call_9", "list_files", json!({}))
        );
    }
}
