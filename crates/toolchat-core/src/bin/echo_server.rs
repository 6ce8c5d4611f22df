//! Small MCP server speaking over stdio
//!
//! Tools: `echo` answers with its `text` argument, `fail` answers with the
//! error flag set and `pid` reports the server's process id. With `--stall`
//! the server never answers the initialize request.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, JsonObject, ListToolsResult, PaginatedRequestParams,
    ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::{json, Value};

struct EchoServer {
    tools: Vec<Tool>,
}

fn schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

impl EchoServer {
    fn new() -> Self {
        let text_input = json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"]
        });
        let no_input = json!({ "type": "object", "properties": {} });

        Self {
            tools: vec![
                Tool::new("echo", "Repeat the given text", schema(text_input)),
                Tool::new("fail", "Always report an error", schema(no_input.clone())),
                Tool::new("pid", "Report the server process id", schema(no_input)),
            ],
        }
    }
}

impl ServerHandler for EchoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools.clone()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        match request.name.as_ref() {
            "echo" => {
                let text = arguments.get("text").and_then(Value::as_str).unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            "fail" => Ok(CallToolResult::error(vec![Content::text("requested failure")])),
            "pid" => Ok(CallToolResult::success(vec![Content::text(std::process::id().to_string())])),
            other => Err(ErrorData::invalid_params(format!("unknown tool: {}", other), None)),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().any(|arg| arg == "--stall") {
        std::future::pending::<()>().await;
    }

    let service = EchoServer::new()
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await?;
    service.waiting().await?;
    Ok(())
}
