//! Error types for the engine and provider seams

use std::path::PathBuf;

/// Failures reported by a rule engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid move '{mv}': {reason}")]
    InvalidMove { mv: String, reason: String },

    #[error("engine unavailable: {0}")]
    Unavailable(String),

    #[error("unexpected engine response: {0}")]
    Protocol(String),

    #[error("HTTP error talking to engine: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failures reported by a chat provider.
///
/// All variants except `MissingCredential` are retryable from the resolver's
/// point of view.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("API key not found (set OPENROUTER_API_KEY or create {})", .0.display())]
    MissingCredential(PathBuf),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned no choices")]
    EmptyResponse,

    #[error("no agent can serve model '{0}'")]
    UnknownModel(String),
}
