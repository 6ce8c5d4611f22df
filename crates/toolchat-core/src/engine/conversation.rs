//! Append-only transcript with turn-taking rules

use thiserror::Error;

use crate::types::{ContentUnit, Role, ToolCall, Turn};

/// A turn that would break the transcript's shape
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversationError {
    #[error("expected a {expected} turn, got a {actual} turn")]
    OutOfTurn { expected: Role, actual: Role },

    #[error("turn has no content")]
    EmptyTurn,

    #[error("{role} turn cannot carry {unit}")]
    InvalidUnit { role: Role, unit: &'static str },

    #[error("tool results {actual:?} do not answer requests {expected:?}")]
    MismatchedResults {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

pub type ConversationResult<T> = Result<T, ConversationError>;

/// Ordered turns of one session
///
/// Submitted (user) and produced (assistant) turns alternate, starting with a
/// submitted turn. After a produced turn with tool requests, the next turn
/// must hold exactly one result per request, in order, and nothing else.
/// Submitted turns are never empty.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Requests the next submitted turn has to answer
    pub fn pending_requests(&self) -> Vec<ToolCall> {
        match self.turns.last() {
            Some(turn) if turn.role == Role::Assistant => turn.tool_calls(),
            _ => Vec::new(),
        }
    }

    /// Append user text or tool results
    pub fn push_submitted(&mut self, turn: Turn) -> ConversationResult<()> {
        if turn.role != Role::User {
            return Err(ConversationError::OutOfTurn {
                expected: Role::User,
                actual: turn.role,
            });
        }
        if let Some(last) = self.turns.last() {
            if last.role == Role::User {
                return Err(ConversationError::OutOfTurn {
                    expected: Role::Assistant,
                    actual: Role::User,
                });
            }
        }
        if turn.units.is_empty() {
            return Err(ConversationError::EmptyTurn);
        }
        if turn
            .units
            .iter()
            .any(|u| matches!(u, ContentUnit::ToolRequest { .. }))
        {
            return Err(ConversationError::InvalidUnit {
                role: Role::User,
                unit: "tool requests",
            });
        }

        let expected: Vec<String> = self.pending_requests().into_iter().map(|c| c.id).collect();
        let results: Vec<String> = turn
            .units
            .iter()
            .filter_map(|u| match u {
                ContentUnit::ToolResult { id, .. } => Some(id.clone()),
                _ => None,
            })
            .collect();

        if expected.is_empty() {
            if !results.is_empty() {
                return Err(ConversationError::MismatchedResults {
                    expected,
                    actual: results,
                });
            }
        } else if results.len() != turn.units.len() || results != expected {
            return Err(ConversationError::MismatchedResults {
                expected,
                actual: results,
            });
        }

        self.turns.push(turn);
        Ok(())
    }

    /// Append a model turn
    ///
    /// A model turn may be empty; it requests nothing and hands the next
    /// turn back to the user.
    pub fn push_produced(&mut self, turn: Turn) -> ConversationResult<()> {
        if turn.role != Role::Assistant {
            return Err(ConversationError::OutOfTurn {
                expected: Role::Assistant,
                actual: turn.role,
            });
        }
        match self.turns.last() {
            Some(last) if last.role == Role::User => {}
            _ => {
                return Err(ConversationError::OutOfTurn {
                    expected: Role::User,
                    actual: Role::Assistant,
                })
            }
        }
        if turn
            .units
            .iter()
            .any(|u| matches!(u, ContentUnit::ToolResult { .. }))
        {
            return Err(ConversationError::InvalidUnit {
                role: Role::Assistant,
                unit: "tool results",
            });
        }

        self.turns.push(turn);
        Ok(())
    }
}
