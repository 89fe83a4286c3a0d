//! agent-hq: keyword-routed, multi-provider LLM agents.
//!
//! A catalog of named agents, each bound to OpenAI, Anthropic, Gemini or
//! Grok with its own model and system prompt, is driven through one
//! [`Orchestrator`](agent::Orchestrator). Free-text queries are routed to an
//! agent by bilingual keyword triggers, every call is recorded in an
//! append-only history, and [`ChainSession`](agent::ChainSession) lets an
//! operator feed one agent's (possibly edited) answer into the next.
//!
//! ```no_run
//! use agent_hq::agent::{AgentCatalog, Orchestrator, ProviderRegistry, QueryRequest, RuntimeConfig};
//!
//! # async fn demo() -> Result<(), agent_hq::error::AgentError> {
//! let config = RuntimeConfig::from_env()?;
//! let providers = ProviderRegistry::from_config(&config)?;
//! let mut orchestrator = Orchestrator::new(AgentCatalog::builtin(), providers);
//!
//! let outcome = orchestrator.process_query(QueryRequest::new("分析這筆資料")).await?;
//! assert_eq!(outcome.agent_name, "nlp_analyzer");
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod cli;
pub mod error;

pub use error::{AgentError, CommandError, ErrorKind, Result};
