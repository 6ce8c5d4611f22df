//! Registry of in-process tools

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::types::ToolSpec;

/// Errors from local tool executors
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Failed(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(e: serde_json::Error) -> Self {
        ToolError::InvalidInput(e.to_string())
    }
}

/// What a local executor returns
pub type ToolOutput = Result<String, ToolError>;

/// An in-process tool executor
pub trait LocalTool: Send + Sync {
    /// Name the model uses to call the tool
    fn name(&self) -> &str;

    /// What the tool does, shown to the model
    fn description(&self) -> &str;

    /// JSON Schema for the input
    fn input_schema(&self) -> Value;

    /// Run the tool with the raw input payload
    fn execute(&self, input: Value) -> ToolOutput;

    /// Definition presented to the model
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(self.name(), self.description()).with_schema(self.input_schema())
    }
}

/// Fixed map from tool name to executor
#[derive(Clone, Default)]
pub struct LocalToolRegistry {
    tools: BTreeMap<String, Arc<dyn LocalTool>>,
}

impl LocalToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in file tools
    pub fn with_builtin_tools() -> Self {
        Self::new()
            .with_tool(super::builtin::ReadFile)
            .with_tool(super::builtin::ListFiles)
            .with_tool(super::builtin::EditFile)
    }

    /// Add a tool (builder style); a later tool with the same name replaces an earlier one
    pub fn with_tool(mut self, tool: impl LocalTool + 'static) -> Self {
        self.register(Arc::new(tool));
        self
    }

    /// Add a shared tool
    pub fn register(&mut self, tool: Arc<dyn LocalTool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn LocalTool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tools in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn LocalTool>> {
        self.tools.values()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl std::fmt::Debug for LocalToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}
