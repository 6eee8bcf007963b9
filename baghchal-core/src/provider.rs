//! Chat-provider seam
//!
//! An agent is just a model identifier; a [`ChatProvider`] turns a
//! conversation into that model's free-text reply.

use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One role-tagged message of a conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: ChatRole::Assistant, content: content.into() }
    }
}

/// Text-generating backend for one or more agents
pub trait ChatProvider {
    /// Complete the conversation as `model`
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// Routes agents to providers by name.
///
/// Agents named `random` or `random:<seed>` go to the local baseline, all
/// others to the remote provider when one is configured.
pub struct ProviderRouter {
    baseline: Box<dyn ChatProvider>,
    remote: Option<Box<dyn ChatProvider>>,
}

impl ProviderRouter {
    pub fn new(baseline: Box<dyn ChatProvider>, remote: Option<Box<dyn ChatProvider>>) -> Self {
        Self { baseline, remote }
    }

    /// True when the agent is served by the local baseline
    pub fn is_baseline(model: &str) -> bool {
        model == "random" || model.starts_with("random:")
    }

    /// True when any of the agents needs the remote provider
    pub fn needs_remote<S: AsRef<str>>(agents: &[S]) -> bool {
        agents.iter().any(|a| !Self::is_baseline(a.as_ref()))
    }
}

impl ChatProvider for ProviderRouter {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        if Self::is_baseline(model) {
            return self.baseline.complete(model, messages);
        }
        match &self.remote {
            Some(remote) => remote.complete(model, messages),
            None => Err(ProviderError::UnknownModel(model.to_string())),
        }
    }
}
