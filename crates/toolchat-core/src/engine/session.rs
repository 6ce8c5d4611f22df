//! The conversation state machine

use std::io;
use std::sync::Arc;

use thiserror::Error;

use super::conversation::{Conversation, ConversationError};
use super::dispatcher::ToolDispatcher;
use super::io::ChatIo;
use crate::logging::Logger;
use crate::providers::{CompletionProvider, ProviderError};
use crate::servers::ToolServerManager;
use crate::tools::{LocalToolRegistry, ToolCatalog};
use crate::types::{CancellationToken, ContentUnit, ToolCall, Turn};
use crate::{log_debug, log_info};

/// Failures that end a session
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Transcript error: {0}")]
    Transcript(#[from] ConversationError),

    #[error("Session cancelled")]
    Cancelled,
}

pub type EngineResult<T> = Result<T, EngineError>;

/// What the engine is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineMode {
    AwaitingUserInput,
    AwaitingModelTurn,
}

/// Drives one interactive session
///
/// Reads a line, asks the model for a turn, shows its text and runs its tool
/// requests in order. While the model keeps requesting tools the results go
/// straight back to it; otherwise the engine waits for the next line.
pub struct ConversationEngine {
    provider: Arc<dyn CompletionProvider>,
    manager: Arc<ToolServerManager>,
    local: LocalToolRegistry,
    dispatcher: ToolDispatcher,
    conversation: Conversation,
    mode: EngineMode,
    logger: Arc<dyn Logger>,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        manager: Arc<ToolServerManager>,
        local: LocalToolRegistry,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let dispatcher = ToolDispatcher::new(Arc::clone(&manager), Arc::clone(&logger));
        Self {
            provider,
            manager,
            local,
            dispatcher,
            conversation: Conversation::new(),
            mode: EngineMode::AwaitingUserInput,
            logger,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn mode(&self) -> EngineMode {
        self.mode
    }

    /// Local tools plus whatever the running servers expose right now
    pub fn catalog(&self) -> ToolCatalog {
        ToolCatalog::merge(&self.local, self.manager.tools(), &self.logger)
    }

    /// Run until input ends, the provider fails or `cancel` fires
    pub async fn run(&mut self, io: &mut dyn ChatIo, cancel: &CancellationToken) -> EngineResult<()> {
        loop {
            match self.mode {
                EngineMode::AwaitingUserInput => {
                    io.prompt().await?;
                    let line = match cancel.run_until_cancelled(io.read_line()).await {
                        Some(line) => line?,
                        None => return Err(EngineError::Cancelled),
                    };
                    let Some(line) = line else {
                        log_info!(self.logger, "[ConversationEngine] End of input after {} turns", self.conversation.len());
                        return Ok(());
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.conversation.push_submitted(Turn::user(line))?;
                    self.mode = EngineMode::AwaitingModelTurn;
                }
                EngineMode::AwaitingModelTurn => {
                    let invoked = self.model_turn(io, cancel).await?;
                    if !invoked {
                        self.mode = EngineMode::AwaitingUserInput;
                    }
                }
            }
        }
    }

    /// One provider call plus the dispatch of its requests
    ///
    /// Returns whether any tool was invoked.
    async fn model_turn(&mut self, io: &mut dyn ChatIo, cancel: &CancellationToken) -> EngineResult<bool> {
        let catalog = self.catalog();
        log_debug!(
            self.logger,
            "[ConversationEngine] Calling {} with {} tools",
            self.provider.name(),
            catalog.len()
        );

        let turn = match self
            .provider
            .chat(self.conversation.turns(), &catalog.specs(), cancel)
            .await
        {
            Ok(turn) => turn,
            Err(_) if cancel.is_cancelled() => return Err(EngineError::Cancelled),
            Err(e) => return Err(e.into()),
        };
        self.conversation.push_produced(turn.clone())?;

        let mut results = Vec::new();
        for unit in turn.units {
            match unit {
                ContentUnit::Text { text } => io.show_text(&text).await?,
                ContentUnit::ToolRequest { id, name, input } => {
                    io.show_tool_call(&name, &input).await?;
                    let call = ToolCall::new(id, name, input);
                    results.push(self.dispatcher.dispatch(call, &catalog, cancel).await);
                }
                ContentUnit::ToolResult { .. } => {}
            }
        }

        if results.is_empty() {
            return Ok(false);
        }
        self.conversation.push_submitted(Turn::tool_results(results))?;
        Ok(true)
    }
}
