//! User-facing input and output for the engine

use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;
use serde_json::Value;

/// Where the engine reads user lines and shows model output
#[async_trait]
pub trait ChatIo: Send {
    /// Signal that a new line is wanted
    async fn prompt(&mut self) -> io::Result<()>;

    /// Next line of user input, or `None` at end of input
    async fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Show model text
    async fn show_text(&mut self, text: &str) -> io::Result<()>;

    /// Trace a tool invocation before it runs
    async fn show_tool_call(&mut self, name: &str, input: &Value) -> io::Result<()>;
}

/// Something the engine did through [`ScriptedIo`]
#[derive(Debug, Clone, PartialEq)]
pub enum IoEvent {
    Prompt,
    Text(String),
    ToolCall { name: String, input: Value },
}

/// In-memory [`ChatIo`] that feeds fixed lines and records output
#[derive(Debug, Default)]
pub struct ScriptedIo {
    lines: VecDeque<String>,
    events: Vec<IoEvent>,
}

impl ScriptedIo {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[IoEvent] {
        &self.events
    }

    /// Model text shown so far
    pub fn texts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                IoEvent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of the tools traced so far
    pub fn tool_traces(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                IoEvent::ToolCall { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn prompts(&self) -> usize {
        self.events.iter().filter(|e| **e == IoEvent::Prompt).count()
    }
}

#[async_trait]
impl ChatIo for ScriptedIo {
    async fn prompt(&mut self) -> io::Result<()> {
        self.events.push(IoEvent::Prompt);
        Ok(())
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }

    async fn show_text(&mut self, text: &str) -> io::Result<()> {
        self.events.push(IoEvent::Text(text.to_string()));
        Ok(())
    }

    async fn show_tool_call(&mut self, name: &str, input: &Value) -> io::Result<()> {
        self.events.push(IoEvent::ToolCall {
            name: name.to_string(),
            input: input.clone(),
        });
        Ok(())
    }
}
