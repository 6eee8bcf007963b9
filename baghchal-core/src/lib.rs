//! Bagh-Chal Arena Core - Agents, rule-engine seam, and move resolution
//!
//! This crate provides the leaf layer of the arena:
//! - Sides, outcomes, termination reasons and PGN result codes
//! - The rule-engine seam and an HTTP adapter for the Bagh-Chal game service
//! - The chat-provider seam, an OpenRouter client and a random baseline agent
//! - Prompt construction and the bounded-retry move resolver
//! - The reporter seam used for run-scoped logging

pub mod side;
pub mod engine;
pub mod remote;
pub mod provider;
pub mod openrouter;
pub mod random_agent;
pub mod prompt;
pub mod resolver;
pub mod reporter;
pub mod error;

// Re-exports for convenient access
pub use side::{Outcome, ResultCode, Side, Termination, Verdict};
pub use engine::{BoardView, RuleEngine};
pub use remote::{HttpEngine, RemoteBoard, RemoteState};
pub use provider::{ChatMessage, ChatProvider, ChatRole, ProviderRouter};
pub use openrouter::{ModelListing, ModelPricing, OpenRouterClient, OpenRouterConfig};
pub use random_agent::RandomAgent;
pub use resolver::{MoveResolver, Resolution, DEFAULT_ATTEMPTS};
pub use reporter::{Level, MemoryReporter, Reporter, TracingReporter};
pub use error::{EngineError, ProviderError};
