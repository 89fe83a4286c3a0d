//! Configured agent: one catalog entry bound to the provider layer.
//!
//! An agent resolves the effective model, system prompt and provider for a
//! request and delegates to the matching [`LlmProvider`](super::provider::LlmProvider).
//! It is the last failure barrier: errors outside the known classes are
//! tagged with the agent name before they leave.

use std::sync::Arc;

use tracing::debug;

use super::catalog::AgentConfig;
use super::client::ProviderRegistry;
use super::config::{DEFAULT_MAX_TOKENS, clamp_max_tokens};
use super::message::{ChatRequest, ChatResponse};
use super::models::ModelCatalog;
use super::provider::ProviderKind;
use crate::error::{AgentError, ErrorKind};

/// A single execution against an agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// User query.
    pub query: String,
    /// Replaces the agent's system prompt when set.
    pub system_prompt_override: Option<String>,
    /// Replaces the agent's model (and possibly provider) when set.
    pub model_override: Option<String>,
    /// Output token budget.
    pub max_tokens: u32,
}

impl ExecutionRequest {
    /// Request with no overrides and the default token budget.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            system_prompt_override: None,
            model_override: None,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the system prompt override; empty strings count as unset.
    #[must_use]
    pub fn system_prompt_override(mut self, prompt: Option<impl Into<String>>) -> Self {
        self.system_prompt_override = prompt.map(Into::into).filter(|p| !p.is_empty());
        self
    }

    /// Sets the model override; empty strings count as unset.
    #[must_use]
    pub fn model_override(mut self, model: Option<impl Into<String>>) -> Self {
        self.model_override = model.map(Into::into).filter(|m| !m.is_empty());
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = n;
        self
    }
}

/// Outcome of the resolution step, before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCall {
    /// Provider that will serve the call.
    pub provider: ProviderKind,
    /// Effective model.
    pub model: String,
    /// Effective system prompt.
    pub system_prompt: String,
}

/// A named, configured agent.
#[derive(Debug, Clone)]
pub struct Agent {
    config: AgentConfig,
    models: Arc<ModelCatalog>,
}

impl Agent {
    /// Binds a config to the model table.
    #[must_use]
    pub const fn new(config: AgentConfig, models: Arc<ModelCatalog>) -> Self {
        Self { config, models }
    }

    /// Agent name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Default model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Full configuration.
    #[must_use]
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Resolves the effective provider, model and system prompt.
    ///
    /// A model override that names a known model redirects the call to that
    /// model's provider; any other override keeps the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnsupportedProvider`] if the provider that
    /// applies is not one of the known identities.
    pub fn resolve(&self, request: &ExecutionRequest) -> Result<ResolvedCall, AgentError> {
        let model = request
            .model_override
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let system_prompt = request
            .system_prompt_override
            .clone()
            .unwrap_or_else(|| self.config.system_prompt.clone());

        let redirected = request
            .model_override
            .as_deref()
            .and_then(|m| self.models.provider_for(m));
        let provider = match redirected {
            Some(kind) => kind,
            None => self.config.provider.parse()?,
        };

        Ok(ResolvedCall {
            provider,
            model,
            system_prompt,
        })
    }

    /// Executes the request and returns the provider's response.
    ///
    /// # Errors
    ///
    /// Known failure classes (missing key, unavailable provider, transport
    /// status, unsupported provider) pass through unchanged. Anything else
    /// becomes [`AgentError::Execution`] naming this agent.
    pub async fn execute(
        &self,
        providers: &ProviderRegistry,
        request: &ExecutionRequest,
    ) -> Result<ChatResponse, AgentError> {
        self.try_execute(providers, request)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedFailure => AgentError::Execution {
                    agent: self.config.name.clone(),
                    message: e.to_string(),
                },
                _ => e,
            })
    }

    async fn try_execute(
        &self,
        providers: &ProviderRegistry,
        request: &ExecutionRequest,
    ) -> Result<ChatResponse, AgentError> {
        let resolved = self.resolve(request)?;
        debug!(
            agent = %self.config.name,
            provider = %resolved.provider,
            model = %resolved.model,
            "executing agent"
        );

        let provider = providers.get(resolved.provider)?;
        let chat = ChatRequest::new(
            &resolved.model,
            &resolved.system_prompt,
            &request.query,
            clamp_max_tokens(request.max_tokens),
        );
        let response = provider.chat(&chat).await?;
        debug!(
            agent = %self.config.name,
            tokens = response.usage.total_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "provider responded"
        );
        Ok(response)
    }
}
