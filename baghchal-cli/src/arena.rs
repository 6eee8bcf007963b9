//! Shared arena wiring: artifact paths, game settings, engine and providers

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use baghchal_core::{
    HttpEngine, OpenRouterClient, OpenRouterConfig, ProviderRouter, RandomAgent, DEFAULT_ATTEMPTS,
};
use baghchal_tournament::{ArenaPaths, GameSettings, DEFAULT_MAX_MOVES};

/// Flags shared by every command
#[derive(Args, Clone, Debug)]
pub struct ArenaArgs {
    /// Root directory for transcripts, match results, run logs and ratings
    #[arg(long, global = true, value_name = "DIR", default_value = "logs")]
    pub logs_dir: PathBuf,

    /// Base URL of the Bagh-Chal game service
    #[arg(long, global = true, default_value = "http://localhost:8000")]
    pub engine_url: String,

    /// Game service request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub engine_timeout: u64,

    /// Pause before every move, in milliseconds
    #[arg(long, global = true, default_value = "2000")]
    pub move_delay_ms: u64,

    /// Moves after which an unfinished game is aborted
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_MOVES)]
    pub max_moves: u32,

    /// Attempts an agent gets to produce a legal move
    #[arg(long, global = true, default_value_t = DEFAULT_ATTEMPTS)]
    pub attempts: usize,

    /// File holding the OpenRouter API key (used when OPENROUTER_API_KEY is unset)
    #[arg(long, global = true, value_name = "FILE", default_value = ".or")]
    pub api_key_file: PathBuf,

    /// Sampling temperature for LLM agents
    #[arg(long, global = true, default_value = "0.2")]
    pub temperature: f32,

    /// Override the OpenRouter API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub provider_url: Option<String>,

    /// Base seed for `random` agents
    #[arg(long, global = true, default_value = "42")]
    pub seed: u64,
}

impl ArenaArgs {
    pub fn paths(&self) -> ArenaPaths {
        ArenaPaths::new(&self.logs_dir)
    }

    pub fn settings(&self) -> GameSettings {
        GameSettings::default()
            .with_max_moves(self.max_moves)
            .with_move_delay(Duration::from_millis(self.move_delay_ms))
            .with_attempts(self.attempts)
    }

    pub fn engine(&self) -> Result<HttpEngine> {
        HttpEngine::new(&self.engine_url, Duration::from_secs(self.engine_timeout))
            .with_context(|| format!("Failed to create game service client for {}", self.engine_url))
    }

    pub fn openrouter(&self) -> Result<OpenRouterClient> {
        let api_key = OpenRouterClient::load_api_key(&self.api_key_file)
            .context("OpenRouter API key required for LLM agents")?;

        let mut config = OpenRouterConfig::default().with_temperature(self.temperature);
        if let Some(url) = &self.provider_url {
            config = config.with_base_url(url);
        }
        OpenRouterClient::new(api_key, config).context("Failed to create OpenRouter client")
    }

    /// Router for the given agents; the OpenRouter client is only built (and the key only
    /// required) when at least one agent is not a `random` baseline
    pub fn provider_for(&self, agents: &[String]) -> Result<ProviderRouter> {
        let remote = if ProviderRouter::needs_remote(agents) {
            Some(Box::new(self.openrouter()?) as Box<dyn baghchal_core::ChatProvider>)
        } else {
            None
        };
        Ok(ProviderRouter::new(Box::new(RandomAgent::new(self.seed)), remote))
    }
}
