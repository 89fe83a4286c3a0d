//! Google Gemini provider over the `generateContent` REST endpoint.
//!
//! Gemini receives a single prompt field: the system prompt and the user
//! query are concatenated rather than sent as separate roles.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use super::http::{build_client, join_url, parse_body, send_once};
use crate::agent::config::ProviderSettings;
use crate::agent::message::{ChatRequest, ChatResponse, TokenUsage};
use crate::agent::provider::{LlmProvider, ProviderKind};
use crate::error::AgentError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Gemini provider using API-key authentication.
pub struct GeminiProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiProvider {
    /// Creates a new provider from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if the HTTP client cannot be built.
    pub fn new(settings: &ProviderSettings, timeout: Duration) -> Result<Self, AgentError> {
        Ok(Self {
            client: build_client(timeout)?,
            api_key: settings.api_key.clone(),
            base_url: settings
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
        })
    }

    /// Folds system prompt and query into Gemini's single prompt.
    fn combined_prompt(request: &ChatRequest) -> String {
        format!(
            "{}\n\nUser Query:\n{}",
            request.system_prompt(),
            request.last_user_content()
        )
    }

    /// `generateContent` URL for `model`, with the model escaped as one path
    /// segment.
    fn endpoint(&self, model: &str) -> Result<Url, AgentError> {
        let mut url = Url::parse(&join_url(&self.base_url, "/v1beta/models")).map_err(|e| {
            AgentError::InvalidConfig {
                message: format!("invalid Gemini base URL {}: {e}", self.base_url),
            }
        })?;
        url.path_segments_mut()
            .map_err(|()| AgentError::InvalidConfig {
                message: format!("Gemini base URL {} cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .push(&format!("{model}:generateContent"));
        Ok(url)
    }

    fn build_body(request: &ChatRequest) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(Self::combined_prompt(request)),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError> {
        let api_key = self.api_key.as_deref().ok_or(AgentError::CredentialMissing {
            provider: ProviderKind::Gemini,
        })?;

        let url = self.endpoint(&request.model)?;
        let http_request = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(&Self::build_body(request));

        let raw = send_once(ProviderKind::Gemini, http_request).await?;
        let parsed: GenerateResponse = parse_body(&raw)?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ResponseParse {
                message: "response contained no candidates".to_string(),
                content: raw.clone(),
            })?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = parsed
            .usage_metadata
            .map_or_else(TokenUsage::default, |u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            });

        Ok(ChatResponse {
            content: text,
            usage,
            finish_reason: candidate.finish_reason.map(|r| r.to_lowercase()),
        })
    }
}
