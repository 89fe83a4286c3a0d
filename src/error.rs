//! Error types for agent-hq.
//!
//! [`AgentError`] covers everything below the CLI: provider calls, agent
//! resolution, orchestration and configuration. Each variant maps onto an
//! [`ErrorKind`] so callers can branch on the failure class while the
//! display string stays human-readable. [`CommandError`] wraps the CLI
//! layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agent::provider::ProviderKind;

/// Result alias for CLI-level operations.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Failure class of an [`AgentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required credential absent for the resolved provider.
    CredentialMissing,
    /// Provider support not compiled into this build.
    LibraryUnavailable,
    /// Non-success HTTP status from a provider.
    TransportError,
    /// Provider identity matches none of the known variants.
    UnsupportedProvider,
    /// Requested or routed agent is not registered.
    AgentNotFound,
    /// Rejected input or configuration value.
    InvalidInput,
    /// Anything else raised while executing.
    UnexpectedFailure,
}

impl ErrorKind {
    /// Returns the snake-case name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CredentialMissing => "credential_missing",
            Self::LibraryUnavailable => "library_unavailable",
            Self::TransportError => "transport_error",
            Self::UnsupportedProvider => "unsupported_provider",
            Self::AgentNotFound => "agent_not_found",
            Self::InvalidInput => "invalid_input",
            Self::UnexpectedFailure => "unexpected_failure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by providers, agents and the orchestrator.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key configured for the provider.
    #[error("{} API key not configured", provider.display_name())]
    CredentialMissing {
        /// Provider whose key is missing.
        provider: ProviderKind,
    },

    /// Provider compiled out via cargo features.
    #[error("{} library not installed", provider.library_name())]
    LibraryUnavailable {
        /// Provider that is unavailable.
        provider: ProviderKind,
    },

    /// Provider answered with a non-success status.
    #[error("{} API error: {status} {body}", provider.short_name())]
    Transport {
        /// Provider that answered.
        provider: ProviderKind,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Provider identity not recognized.
    #[error("Unsupported LLM provider: {name}")]
    UnsupportedProvider {
        /// The unrecognized identity.
        name: String,
    },

    /// Agent name absent from the registry.
    #[error("Agent {name} not found")]
    AgentNotFound {
        /// The requested name.
        name: String,
    },

    /// API request failed before a response could be read.
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error description.
        message: String,
        /// HTTP status, when one was received.
        status: Option<u16>,
    },

    /// Response body could not be interpreted.
    #[error("Failed to parse response: {message}")]
    ResponseParse {
        /// Error description.
        message: String,
        /// Raw content that failed to parse.
        content: String,
    },

    /// Unexpected failure, tagged with the agent that raised it.
    #[error("Error executing agent {agent}: {message}")]
    Execution {
        /// Agent name.
        agent: String,
        /// Underlying failure message.
        message: String,
    },

    /// Chain step attempted with blank input.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What was wrong.
        message: String,
    },

    /// Agent catalog could not be read or parsed.
    #[error("Failed to load agent catalog {path}: {message}")]
    Catalog {
        /// Catalog path.
        path: String,
        /// Error description.
        message: String,
    },
}

impl AgentError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::CredentialMissing { .. } => ErrorKind::CredentialMissing,
            Self::LibraryUnavailable { .. } => ErrorKind::LibraryUnavailable,
            Self::Transport { .. } => ErrorKind::TransportError,
            Self::UnsupportedProvider { .. } => ErrorKind::UnsupportedProvider,
            Self::AgentNotFound { .. } => ErrorKind::AgentNotFound,
            Self::EmptyInput | Self::InvalidConfig { .. } => ErrorKind::InvalidInput,
            Self::ApiRequest { .. }
            | Self::ResponseParse { .. }
            | Self::Execution { .. }
            | Self::Catalog { .. } => ErrorKind::UnexpectedFailure,
        }
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        Self::ApiRequest {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Command could not be carried out.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Agent layer error.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// I/O error on the terminal streams.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
