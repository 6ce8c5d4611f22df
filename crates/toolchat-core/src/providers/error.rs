//! Provider error types
//!
//! Every variant is fatal to the session: the engine stops and reports it.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// The request or the response stream failed inside genai
    #[error("{provider} request failed: {source}")]
    Request {
        provider: String,
        #[source]
        source: genai::Error,
    },

    /// The stream closed without an end event
    #[error("Response stream ended before completion")]
    StreamEnded,

    #[error("Request cancelled")]
    Cancelled,

    /// Failure injected by the scripted provider
    #[error("Scripted provider: {0}")]
    Scripted(String),
}

impl ProviderError {
    pub fn request(provider: impl Into<String>, source: genai::Error) -> Self {
        Self::Request {
            provider: provider.into(),
            source,
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;
