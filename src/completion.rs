//! Chat-completion provider abstraction.
//!
//! The query handler only needs one thing from a language model: given a
//! system prompt and a user message, return the first choice's text. That
//! contract is the [`CompletionProvider`] trait; [`OpenAIProvider`] speaks the
//! OpenAI-compatible `POST /chat/completions` API.
//!
//! # Failure Behavior
//!
//! Calls are made exactly once. There is no retry and no backoff; any
//! transport error, non-success status, or malformed payload is returned to
//! the caller, which maps it to a generic 500.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::CompletionConfig;

/// A single chat message in OpenAI wire format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Everything a provider needs for one completion, minus the model name.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Backend that turns a [`CompletionRequest`] into reply text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Model identifier sent with every request (e.g. `"gpt-3.5-turbo"`).
    fn model_name(&self) -> &str;

    /// Returns the text of the first choice.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

// ============ OpenAI Provider ============

/// Provider for the OpenAI chat-completions API or any compatible server.
///
/// The API key is read from the environment once, at construction. A missing
/// key does not prevent construction; every call then fails, which lets the
/// server start and still answer sample queries.
pub struct OpenAIProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAIProvider {
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            tracing::warn!(
                env = %config.api_key_env,
                "completion API key not set; non-sample queries will fail"
            );
        }
        Self::with_key(config, api_key)
    }

    /// Builds a provider with an explicit key instead of reading the environment.
    pub fn with_key(config: &CompletionConfig, api_key: Option<String>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("completion API key not configured"))?;

        let body = ChatCompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("completion API error {}: {}", status, body_text);
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .context("completion response was not JSON")?;
        parse_chat_response(&payload)
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
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

/// Extracts `choices[0].message.content` from a chat-completions payload.
pub fn parse_chat_response(payload: &serde_json::Value) -> Result<String> {
    let parsed: ChatCompletionResponse = serde_json::from_value(payload.clone())
        .context("Invalid completion response: unexpected shape")?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| anyhow!("Invalid completion response: no message content"))
}
