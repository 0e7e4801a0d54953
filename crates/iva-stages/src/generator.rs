//! Text-generation collaborator: the remote-model boundary.
//!
//! Stages depend only on the `TextGenerator` trait; how a completion
//! is obtained stays opaque to the pipeline. The shipped
//! implementation talks to an OpenAI-compatible chat-completions
//! endpoint over blocking HTTP with a hard request timeout, so a hung
//! remote call surfaces as an error instead of stalling the run.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Produces a completion for a prompt.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError>;
}

#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("GEN/HTTP: {0}")]
    Http(String),

    #[error("GEN/TIMEOUT: {0}")]
    Timeout(String),

    #[error("GEN/STATUS: upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GEN/EMPTY: completion contained no choices")]
    EmptyCompletion,
}

/// Connection settings for the completion endpoint.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl GeneratorConfig {
    /// Reads settings from the environment, with local defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("IVA_LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: std::env::var("IVA_LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            api_key: std::env::var("IVA_LLM_API_KEY").ok(),
            timeout: Duration::from_millis(
                std::env::var("IVA_LLM_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60_000),
            ),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

const SYSTEM_PROMPT: &str =
    "You are a startup idea analyst. Answer with a single JSON object and nothing else.";

/// OpenAI-compatible chat-completions client.
pub struct HttpTextGenerator {
    http: reqwest::blocking::Client,
    config: GeneratorConfig,
}

impl HttpTextGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, GeneratorError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeneratorError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, GeneratorError> {
        Self::new(GeneratorConfig::from_env())
    }
}

impl TextGenerator for HttpTextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.7,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let mut builder = self.http.post(&url).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        tracing::debug!(model = %self.config.model, "requesting completion");
        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                GeneratorError::Timeout(e.to_string())
            } else {
                GeneratorError::Http(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| GeneratorError::Http(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(GeneratorError::EmptyCompletion)
    }
}
