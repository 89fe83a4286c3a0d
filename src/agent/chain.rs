//! Manual chaining: run one agent, let the operator edit the answer, feed it
//! to the next agent.
//!
//! Nothing is chained automatically. [`ChainSession::run`] stores the answer
//! and waits; [`ChainSession::promote`] makes the (possibly edited) text the
//! next input.

use tracing::debug;

use super::orchestrator::{Orchestrator, QueryRequest};
use crate::error::AgentError;

/// Where the session is in the run/promote cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChainPhase {
    /// Waiting for a run.
    #[default]
    Idle,
    /// A run produced output that has not been promoted yet.
    AwaitingPromotion,
}

/// Parameters of one chain step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    /// Agent to run; never routed.
    pub agent: String,
    /// Model override.
    pub model: Option<String>,
    /// Token budget.
    pub max_tokens: Option<u32>,
    /// System prompt override.
    pub system_prompt: Option<String>,
}

impl ChainStep {
    /// Step against `agent` with no overrides.
    #[must_use]
    pub fn new(agent: impl Into<String>) -> Self {
        Self {
            agent: agent.into(),
            model: None,
            max_tokens: None,
            system_prompt: None,
        }
    }
}

/// Input/output cursor of an interactive chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainSession {
    current_input: String,
    last_output: String,
    phase: ChainPhase,
}

impl ChainSession {
    /// Empty session in the idle phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `step` on `input` and stores the answer as the last output.
    ///
    /// The current input is left alone; only [`promote`](Self::promote)
    /// replaces it. Failures, including an unknown agent, are stored as
    /// their message text the same way a successful answer is.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::EmptyInput`] if `input` is blank; the session
    /// is left unchanged.
    pub async fn run(
        &mut self,
        orchestrator: &mut Orchestrator,
        step: &ChainStep,
        input: &str,
    ) -> Result<&str, AgentError> {
        if input.trim().is_empty() {
            return Err(AgentError::EmptyInput);
        }

        let mut request = QueryRequest::new(input).agent(step.agent.clone());
        request.model_override.clone_from(&step.model);
        request.system_prompt_override.clone_from(&step.system_prompt);
        request.max_tokens = step.max_tokens;

        let text = match orchestrator.process_query(request).await {
            Ok(outcome) => outcome.response.text,
            Err(e) => e.to_string(),
        };
        debug!(agent = %step.agent, chars = text.len(), "chain step finished");

        self.last_output = text;
        self.phase = ChainPhase::AwaitingPromotion;
        Ok(&self.last_output)
    }

    /// Makes `text` the next input and returns to [`ChainPhase::Idle`].
    pub fn promote(&mut self, text: impl Into<String>) {
        self.current_input = text.into();
        self.phase = ChainPhase::Idle;
    }

    /// Input for the next run.
    #[must_use]
    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    /// Output of the last run.
    #[must_use]
    pub fn last_output(&self) -> &str {
        &self.last_output
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ChainPhase {
        self.phase
    }
}
