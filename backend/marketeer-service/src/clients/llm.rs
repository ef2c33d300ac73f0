/// Completion provider client
///
/// Single chat-completion call per generation request against an
/// OpenAI-compatible endpoint. Sampling parameters are fixed per call from
/// configuration. Provider auth and rate-limit failures map to 401/429;
/// everything else surfaces as a 500.
use crate::config::LlmConfig;
use crate::error::AppError;
use crate::metrics;
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Seam between the generation service and the completion backend, so tests
/// can substitute a scripted provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion for the prompt and return its raw text
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}

/// Reqwest-backed completion client
pub struct LlmClient {
    http: HttpClient,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

impl LlmClient {
    pub fn new(config: &LlmConfig) -> Result<Self, AppError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        })
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
    max_tokens: u32,
    top_p: f64,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionProvider for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            top_p: self.top_p,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::PROVIDER_CALLS
                    .with_label_values(&["llm", "transport_error"])
                    .inc();
                AppError::Llm(format!("completion request failed: {}", e))
            })?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                metrics::PROVIDER_CALLS
                    .with_label_values(&["llm", "auth_error"])
                    .inc();
                return Err(AppError::ProviderAuth("Invalid API key".to_string()));
            }
            StatusCode::TOO_MANY_REQUESTS => {
                metrics::PROVIDER_CALLS
                    .with_label_values(&["llm", "rate_limited"])
                    .inc();
                return Err(AppError::RateLimited(
                    "Completion provider rate limit exceeded. Please try again later.".to_string(),
                ));
            }
            status if !status.is_success() => {
                metrics::PROVIDER_CALLS
                    .with_label_values(&["llm", "error"])
                    .inc();
                return Err(AppError::Llm(format!(
                    "completion endpoint returned {}",
                    status
                )));
            }
            _ => {}
        }

        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("malformed completion response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Llm("completion response contained no content".to_string()))?;

        metrics::PROVIDER_CALLS
            .with_label_values(&["llm", "ok"])
            .inc();
        debug!(chars = content.len(), "completion received");

        Ok(content)
    }
}
