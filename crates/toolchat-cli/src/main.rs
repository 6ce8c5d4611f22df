use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::mpsc;

use toolchat_core::engine::{ChatIo, ConversationEngine, EngineError};
use toolchat_core::logging::{ConsoleLogger, Logger};
use toolchat_core::providers::{CompletionProvider, GenaiProvider, ProviderModelConfig};
use toolchat_core::servers::ToolServerManager;
use toolchat_core::tools::LocalToolRegistry;
use toolchat_core::{load_config, CancellationToken};

const DEFAULT_MODEL: &str = "claude-3-7-sonnet-latest";

#[derive(Debug, Parser)]
#[command(name = "toolchat", about = "Chat with a model that can use local and MCP server tools")]
struct Args {
    /// Tool server configuration (JSON, or YAML by extension)
    #[arg(long, default_value = "toolchat.json")]
    config: PathBuf,

    /// Model to talk to; a `provider/` prefix is accepted
    #[arg(long, env = "TOOLCHAT_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per model turn
    #[arg(long, env = "TOOLCHAT_MAX_TOKENS", default_value_t = toolchat_core::providers::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
}

/// Read lines on a dedicated thread
///
/// A blocked read never holds up runtime shutdown, so an interrupted session
/// exits without waiting for the next line.
fn spawn_line_reader<R: Read + Send + 'static>(reader: R) -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(1);
    std::thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Line-based stdin/stdout with colored speaker labels
struct TerminalIo {
    lines: mpsc::Receiver<io::Result<String>>,
    stdout: Stdout,
}

impl TerminalIo {
    fn new() -> Self {
        Self::with_reader(io::stdin())
    }

    fn with_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            lines: spawn_line_reader(reader),
            stdout: tokio::io::stdout(),
        }
    }

    async fn write(&mut self, text: &str) -> io::Result<()> {
        self.stdout.write_all(text.as_bytes()).await?;
        self.stdout.flush().await
    }
}

#[async_trait]
impl ChatIo for TerminalIo {
    async fn prompt(&mut self) -> io::Result<()> {
        self.write("\u{1b}[94mYou\u{1b}[0m: ").await
    }

    async fn read_line(&mut self) -> io::Result<Option<String>> {
        self.lines.recv().await.transpose()
    }

    async fn show_text(&mut self, text: &str) -> io::Result<()> {
        self.write(&format!("\u{1b}[93mAssistant\u{1b}[0m: {}\n", text)).await
    }

    async fn show_tool_call(&mut self, name: &str, input: &Value) -> io::Result<()> {
        self.write(&format!("\u{1b}[92mtool\u{1b}[0m: {}({})\n", name, input)).await
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new());

    let config = match load_config(&args.config, &logger) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return;
        }
    };

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let manager = Arc::new(ToolServerManager::from_config(&config, Arc::clone(&logger)));
    let report = manager.start_all(&cancel).await;
    for (name, error) in &report.failed {
        eprintln!("Failed to start tool server '{}': {}", name, error);
    }

    let provider: Arc<dyn CompletionProvider> = Arc::new(GenaiProvider::new(
        ProviderModelConfig::new(&args.model).with_max_tokens(args.max_tokens),
        Arc::clone(&logger),
    ));

    let mut engine = ConversationEngine::new(
        provider,
        Arc::clone(&manager),
        LocalToolRegistry::with_builtin_tools(),
        Arc::clone(&logger),
    );
    println!(
        "Chat with {} ({} tools, {} of {} servers running). Use Ctrl-D to quit.",
        args.model,
        engine.catalog().len(),
        report.running.len(),
        manager.len()
    );

    let mut io = TerminalIo::new();

    match engine.run(&mut io, &cancel).await {
        Ok(()) | Err(EngineError::Cancelled) => {}
        Err(e) => eprintln!("Error: {}", e),
    }

    let stopped = manager.stop_all().await;
    for (name, error) in &stopped.failures {
        eprintln!("Failed to stop tool server '{}': {}", name, error);
    }
}
