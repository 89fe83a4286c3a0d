//! Multi-provider agent layer.
//!
//! Named agents from a YAML catalog are bound to one of four LLM providers
//! and driven through a single [`Orchestrator`] that routes free text by
//! keyword, executes one provider call and records every call.
//!
//! # Architecture
//!
//! ```text
//! User query → Orchestrator
//!   ├── Router (keyword triggers → agent name)
//!   ├── Agent (catalog entry + ModelCatalog → provider, model, prompt)
//!   │   └── ProviderRegistry → LlmProvider (OpenAI | Anthropic | Gemini | Grok)
//!   ├── History (append-only call log)
//!   └── QueryOutcome
//! ChainSession → Orchestrator (manual output → input promotion)
//! ```
//!
//! # Feature Gates
//!
//! Each provider sits behind a cargo feature of the same name, all enabled by
//! default:
//! ```toml
//! [dependencies]
//! agent-hq = { version = "...", default-features = false, features = ["anthropic"] }
//! ```

pub mod catalog;
pub mod chain;
pub mod client;
pub mod config;
pub mod configured;
pub mod history;
pub mod message;
pub mod models;
pub mod orchestrator;
pub mod provider;
pub mod providers;
pub mod router;

// Re-export key types
pub use catalog::{AgentCatalog, AgentConfig};
pub use chain::{ChainPhase, ChainSession, ChainStep};
pub use client::{ProviderRegistry, create_provider};
pub use config::{ProviderSettings, ProviderStatus, RuntimeConfig, RuntimeConfigBuilder};
pub use configured::{Agent, ExecutionRequest, ResolvedCall};
pub use history::{AgentUsage, History, HistoryRecord};
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use models::{ModelCatalog, ModelEntry};
pub use orchestrator::{ExecutionResult, Orchestrator, QueryOutcome, QueryRequest};
pub use provider::{LlmProvider, ProviderKind};
pub use router::{Route, Router};
