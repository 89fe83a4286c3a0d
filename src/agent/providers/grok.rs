//! xAI Grok provider: a direct HTTPS call to the chat completions endpoint.
//!
//! Unlike the other providers the timeout is fixed, and only an exact
//! `200 OK` counts as success.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;

use super::http::{build_client, join_url, parse_body};
use crate::agent::config::ProviderSettings;
use crate::agent::message::{ChatMessage, ChatRequest, ChatResponse, TokenUsage};
use crate::agent::provider::{LlmProvider, ProviderKind};
use crate::error::AgentError;

const GROK_API_BASE: &str = "https://api.x.ai";
/// Fixed transport timeout for Grok requests.
pub const GROK_TIMEOUT: Duration = Duration::from_secs(60);

/// Grok provider.
pub struct GrokProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

impl GrokProvider {
    /// Creates a new provider from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if the HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings) -> Result<Self, AgentError> {
        Ok(Self {
            client: build_client(GROK_TIMEOUT)?,
            api_key: settings.api_key.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| GROK_API_BASE.to_string()),
        })
    }

    /// Pulls `choices[0].message.content` out of the envelope, falling back
    /// to the pretty-printed body when the shape is unexpected.
    fn extract_text(data: &Value) -> String {
        data.pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map_or_else(
                || serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string()),
                str::to_string,
            )
    }

    fn extract_usage(data: &Value) -> TokenUsage {
        let field = |name: &str| {
            data.pointer(&format!("/usage/{name}"))
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0)
        };
        TokenUsage {
            prompt_tokens: field("prompt_tokens"),
            completion_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    }
}

impl std::fmt::Debug for GrokProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrokProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for GrokProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Grok
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::CredentialMissing {
            provider: ProviderKind::Grok,
        })?;

        let body = CompletionRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(join_url(&self.base_url, "/v1/chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let raw = response.text().await?;
        if status != StatusCode::OK {
            return Err(AgentError::Transport {
                provider: ProviderKind::Grok,
                status: status.as_u16(),
                body: raw,
            });
        }

        let data: Value = parse_body(&raw)?;
        let finish_reason = data
            .pointer("/choices/0/finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(ChatResponse {
            content: Self::extract_text(&data),
            usage: Self::extract_usage(&data),
            finish_reason,
        })
    }
}
