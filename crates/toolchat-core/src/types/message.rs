//! Conversation turn types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::tool::{ToolCall, ToolResult};

/// Which side of the conversation contributed a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Submitted by the user side: typed text or tool results
    User,
    /// Produced by the model
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One atomic piece of a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentUnit {
    /// Plain text
    Text {
        text: String,
    },
    /// The model asking for a tool to be run
    ToolRequest {
        id: String,
        name: String,
        input: Value,
    },
    /// The outcome of a tool request, matched by id
    ToolResult {
        id: String,
        output: String,
        #[serde(rename = "isError", default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentUnit {
    /// Create a text unit
    pub fn text(text: impl Into<String>) -> Self {
        ContentUnit::Text { text: text.into() }
    }

    /// Create a tool request unit
    pub fn tool_request(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        ContentUnit::ToolRequest {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    /// Get the text if this is a text unit
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentUnit::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Borrow this unit as a tool call if it is a request
    pub fn as_tool_call(&self) -> Option<ToolCall> {
        match self {
            ContentUnit::ToolRequest { id, name, input } => {
                Some(ToolCall::new(id.clone(), name.clone(), input.clone()))
            }
            _ => None,
        }
    }
}

impl From<ToolResult> for ContentUnit {
    fn from(result: ToolResult) -> Self {
        ContentUnit::ToolResult {
            id: result.call_id,
            output: result.content,
            is_error: result.is_error,
        }
    }
}

impl From<ToolCall> for ContentUnit {
    fn from(call: ToolCall) -> Self {
        ContentUnit::ToolRequest {
            id: call.id,
            name: call.name,
            input: call.input,
        }
    }
}

/// One contribution to the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub units: Vec<ContentUnit>,
}

impl Turn {
    /// Create a user turn holding a single line of text
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            units: vec![ContentUnit::text(text)],
        }
    }

    /// Create a produced (model) turn
    pub fn assistant(units: Vec<ContentUnit>) -> Self {
        Self {
            role: Role::Assistant,
            units,
        }
    }

    /// Create a submitted turn carrying tool results
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::User,
            units: results.into_iter().map(ContentUnit::from).collect(),
        }
    }

    /// Tool requests in the order the model issued them
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.units.iter().filter_map(ContentUnit::as_tool_call).collect()
    }

    /// Whether this turn asks for any tool to be run
    pub fn has_tool_requests(&self) -> bool {
        self.units
            .iter()
            .any(|u| matches!(u, ContentUnit::ToolRequest { .. }))
    }

    /// Concatenated text of all text units
    pub fn text(&self) -> String {
        self.units
            .iter()
            .filter_map(ContentUnit::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}
