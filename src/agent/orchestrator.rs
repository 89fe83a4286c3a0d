//! Orchestrator: the single entry point for running queries.
//!
//! Owns the agent registry, the router, the provider registry and the
//! conversation history. Every call performs at most one provider request;
//! failures below this layer come back as response text so they can be
//! shown and recorded like any other answer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::catalog::AgentCatalog;
use super::client::ProviderRegistry;
use super::config::DEFAULT_MAX_TOKENS;
use super::configured::{Agent, ExecutionRequest};
use super::history::History;
use super::message::{ChatResponse, TokenUsage};
use super::models::ModelCatalog;
use super::router::Router;
use crate::error::{AgentError, ErrorKind};

/// Text of an execution together with its failure class, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    /// Completion text, or the failure message.
    pub text: String,
    /// Failure class when the call did not succeed.
    pub error: Option<ErrorKind>,
    /// Token usage reported by the provider; zero on failure.
    pub usage: TokenUsage,
    /// Why the model stopped, when the provider says.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl ExecutionResult {
    /// Whether the call succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<ChatResponse, AgentError>> for ExecutionResult {
    fn from(result: Result<ChatResponse, AgentError>) -> Self {
        match result {
            Ok(response) => Self {
                text: response.content,
                error: None,
                usage: response.usage,
                finish_reason: response.finish_reason,
            },
            Err(e) => Self {
                error: Some(e.kind()),
                text: e.to_string(),
                ..Self::default()
            },
        }
    }
}

/// Arguments of [`Orchestrator::process_query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryRequest {
    /// User query.
    pub query: String,
    /// Explicit agent; routed from the query when unset.
    pub agent: Option<String>,
    /// System prompt override.
    pub system_prompt_override: Option<String>,
    /// Model override.
    pub model_override: Option<String>,
    /// Token budget; the orchestrator default when unset.
    pub max_tokens: Option<u32>,
}

impl QueryRequest {
    /// Query with routing and no overrides.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    /// Pins the agent.
    #[must_use]
    pub fn agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Sets the system prompt override.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt_override = Some(prompt.into());
        self
    }

    /// Sets the model override.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    /// Sets the token budget.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }
}

/// Result of a recorded call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryOutcome {
    /// Agent that served the call.
    pub agent_name: String,
    /// Response text and failure class.
    pub response: ExecutionResult,
    /// Timestamp of the history record.
    pub timestamp: DateTime<Utc>,
    /// Model recorded for the call (override, else agent default).
    pub model: String,
}

/// Routes queries to agents and records every call.
#[derive(Debug)]
pub struct Orchestrator {
    agents: Vec<Agent>,
    router: Router,
    providers: ProviderRegistry,
    models: Arc<ModelCatalog>,
    history: History,
    default_max_tokens: u32,
}

impl Orchestrator {
    /// Creates an orchestrator over `catalog` with the built-in router and
    /// model table.
    #[must_use]
    pub fn new(catalog: AgentCatalog, providers: ProviderRegistry) -> Self {
        Self::with_parts(
            catalog,
            providers,
            Router::default(),
            Arc::new(ModelCatalog::default()),
        )
    }

    /// Creates an orchestrator with an explicit router and model table.
    #[must_use]
    pub fn with_parts(
        catalog: AgentCatalog,
        providers: ProviderRegistry,
        router: Router,
        models: Arc<ModelCatalog>,
    ) -> Self {
        let agents: Vec<Agent> = catalog
            .into_iter()
            .map(|config| Agent::new(config, Arc::clone(&models)))
            .collect();
        info!(agents = agents.len(), "orchestrator ready");
        Self {
            agents,
            router,
            providers,
            models,
            history: History::default(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Sets the token budget used when a request does not carry one.
    #[must_use]
    pub const fn default_max_tokens(mut self, n: u32) -> Self {
        self.default_max_tokens = n;
        self
    }

    /// Runs one query: route if needed, execute, record, return.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] when the selected or routed
    /// agent is not registered. History is unchanged in that case. Every
    /// other failure is reported inside the outcome's [`ExecutionResult`].
    pub async fn process_query(
        &mut self,
        request: QueryRequest,
    ) -> Result<QueryOutcome, AgentError> {
        let agent_name = match request.agent.as_deref().filter(|a| !a.is_empty()) {
            Some(name) => name.to_string(),
            None => self.router.route(&request.query).to_string(),
        };

        let agent = self
            .agent(&agent_name)
            .ok_or_else(|| AgentError::AgentNotFound {
                name: agent_name.clone(),
            })?;

        let execution = ExecutionRequest::new(request.query.clone())
            .system_prompt_override(request.system_prompt_override)
            .model_override(request.model_override)
            .max_tokens(request.max_tokens.unwrap_or(self.default_max_tokens));

        let model = execution
            .model_override
            .clone()
            .unwrap_or_else(|| agent.model().to_string());

        let response = ExecutionResult::from(agent.execute(&self.providers, &execution).await);
        if let Some(kind) = response.error {
            warn!(agent = %agent_name, %kind, "agent call failed");
        } else {
            info!(
                agent = %agent_name,
                %model,
                tokens = response.usage.total_tokens,
                "agent call completed"
            );
        }

        let record = self
            .history
            .append(&agent_name, &request.query, &response.text, &model);

        Ok(QueryOutcome {
            agent_name,
            timestamp: record.timestamp,
            model,
            response,
        })
    }

    /// Registered agent by name.
    #[must_use]
    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name() == name)
    }

    /// Registered agents in catalog order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Agent names in catalog order.
    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(Agent::name)
    }

    /// The router.
    #[must_use]
    pub const fn router(&self) -> &Router {
        &self.router
    }

    /// The model table.
    #[must_use]
    pub fn models(&self) -> &ModelCatalog {
        &self.models
    }

    /// The conversation history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }
}
