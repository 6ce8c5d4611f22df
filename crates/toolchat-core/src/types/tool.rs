//! Tool calling types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool as the model sees it: name, purpose and input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Unique within one catalog
    pub name: String,
    pub description: String,
    /// JSON Schema the input must satisfy
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl ToolSpec {
    /// Definition accepting any object input
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    /// Replace the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

/// A request by the model to run one tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id chosen by the model; echoed back in the result
    pub id: String,
    pub name: String,
    /// Raw arguments, passed through unchanged
    pub input: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Outcome of a [`ToolCall`], returned to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(rename = "callId")]
    pub call_id: String,
    /// Output text, or the failure message when `is_error` is set
    pub content: String,
    #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful output
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Failure the model should see and may recover from
    pub fn error(call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: error.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_schema_is_open_object() {
        let spec = ToolSpec::new("list_files", "List files");
        assert_eq!(spec.input_schema, json!({ "type": "object", "properties": {} }));

        let spec = spec.with_schema(json!({ "type": "object", "required": ["path"] }));
        assert_eq!(spec.input_schema["required"][0], "path");
    }

    #[test]
    fn test_result_serialization_omits_false_error_flag() {
        let ok = serde_json::to_value(ToolResult::success("toolu_01", "done")).unwrap();
        assert_eq!(ok, json!({ "callId": "toolu_01", "content": "done" }));

        let failed = serde_json::to_value(ToolResult::error("toolu_02", "tool not found: x")).unwrap();
        assert_eq!(failed["isError"], true);
    }
}
