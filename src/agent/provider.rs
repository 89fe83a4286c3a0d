//! Pluggable LLM provider trait.
//!
//! Implementations translate provider-agnostic [`ChatRequest`]/[`ChatResponse`]
//! into provider-specific wire calls. Agents and the orchestrator never
//! branch on provider identity beyond picking which implementation to call.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Identity of a supported LLM backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// `OpenAI` chat completions.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini.
    Gemini,
    /// xAI Grok.
    Grok,
}

impl ProviderKind {
    /// All providers in display order.
    pub const ALL: [Self; 4] = [Self::OpenAi, Self::Anthropic, Self::Gemini, Self::Grok];

    /// Catalog identity (`"openai"`, `"anthropic"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
        }
    }

    /// Name used in credential messages.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::Grok => "Grok (xAI)",
        }
    }

    /// Name used in transport error messages.
    #[must_use]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Gemini",
            Self::Grok => "Grok",
        }
    }

    /// Client library backing this provider.
    #[must_use]
    pub const fn library_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::Anthropic => "Anthropic",
            Self::Gemini => "Google Generative AI",
            Self::Grok => "HTTP transport",
        }
    }

    /// Environment variable holding the API key.
    #[must_use]
    pub const fn key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
            Self::Grok => "GROK_API_KEY",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "grok" => Ok(Self::Grok),
            _ => Err(AgentError::UnsupportedProvider {
                name: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for LLM provider backends.
///
/// Implementations own the transport (SDK or HTTP) for one provider and
/// present a uniform, at-most-once interface: no implementation retries.
/// Missing credentials are reported from [`LlmProvider::chat`] rather than
/// at construction so a registry can always be built.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Which provider this is.
    fn kind(&self) -> ProviderKind;

    /// Executes a chat completion request and returns the primary text.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] for missing credentials, non-success
    /// statuses, transport failures, or unreadable responses.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_providers() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().ok(), Some(kind));
        }
        assert_eq!("  OpenAI ".parse::<ProviderKind>().ok(), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn test_parse_unknown_provider() {
        let err = "mistral".parse::<ProviderKind>();
        assert!(matches!(
            err,
            Err(AgentError::UnsupportedProvider { ref name }) if name == "mistral"
        ));
    }

    #[test]
    fn test_provider_serialization() {
        let json = serde_json::to_string(&ProviderKind::OpenAi).unwrap_or_default();
        assert_eq!(json, "\"openai\"");
        let json = serde_json::to_string(&ProviderKind::Anthropic).unwrap_or_default();
        assert_eq!(json, "\"anthropic\"");
    }
}
