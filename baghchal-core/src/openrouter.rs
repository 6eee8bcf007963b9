//! OpenRouter chat-completion client

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::provider::{ChatMessage, ChatProvider};

/// Environment variable consulted before the key file
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// OpenRouter client configuration
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Base URL for the OpenAI-compatible API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Sampling temperature for move generation
    pub temperature: f32,
    /// Sent as `HTTP-Referer` for attribution
    pub referer: String,
    /// Sent as `X-Title` for attribution
    pub title: String,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.2,
            referer: "https://github.com/baghchal-arena/baghchal-arena".to_string(),
            title: "Bagh-Chal Arena".to_string(),
        }
    }
}

impl OpenRouterConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Per-token and per-request prices, as decimal strings in USD
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub completion: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub request: Option<String>,
}

impl ModelPricing {
    fn price(value: &Option<String>) -> Option<f64> {
        value.as_deref().and_then(|v| v.trim().parse().ok())
    }

    pub fn prompt_per_million(&self) -> Option<f64> {
        Self::price(&self.prompt).map(|p| p * 1_000_000.0)
    }

    pub fn completion_per_million(&self) -> Option<f64> {
        Self::price(&self.completion).map(|p| p * 1_000_000.0)
    }

    pub fn image(&self) -> Option<f64> {
        Self::price(&self.image)
    }

    pub fn request(&self) -> Option<f64> {
        Self::price(&self.request)
    }

    /// Free only when every price is present-or-defaulted and zero.
    /// Malformed prices count as paid.
    pub fn is_free(&self) -> bool {
        let required = [&self.prompt, &self.completion];
        let optional = [&self.image, &self.request];

        required.iter().all(|p| Self::price(p) == Some(0.0))
            && optional
                .iter()
                .all(|p| p.is_none() || Self::price(p) == Some(0.0))
    }
}

/// One entry of the model catalogue
#[derive(Debug, Clone, Deserialize)]
pub struct ModelListing {
    pub id: String,
    #[serde(default)]
    pub pricing: ModelPricing,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelListing>,
}

/// OpenRouter client for move generation and model discovery
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(api_key: String, config: OpenRouterConfig) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, api_key, config })
    }

    /// Read the API key from the environment or a key file
    pub fn load_api_key(key_file: &Path) -> Result<String, ProviderError> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key.trim().to_string());
            }
        }
        match std::fs::read_to_string(key_file) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ProviderError::MissingCredential(key_file.to_path_buf())),
        }
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .post(format!("{}{}", self.config.base_url, path))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
    }

    /// Fetch the model catalogue, sorted by id
    pub fn list_models(&self) -> Result<Vec<ModelListing>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let mut models = response.json::<ModelsResponse>()?.data;
        models.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(models)
    }
}

impl ChatProvider for OpenRouterClient {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = CompletionRequest {
            model,
            messages,
            temperature: self.config.temperature,
        };
        let response = self.post("/chat/completions").json(&request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        let completion: CompletionResponse = response.json()?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(ProviderError::EmptyResponse)
    }
}
