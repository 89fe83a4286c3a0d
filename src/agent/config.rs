//! Runtime configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! A missing API key is never a build error; the affected provider reports
//! [`AgentError::CredentialMissing`] when it is called.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::provider::ProviderKind;
use crate::error::AgentError;

/// Default output token budget per request.
pub const DEFAULT_MAX_TOKENS: u32 = 12_000;
/// Upper bound applied to every request's token budget.
pub const MAX_TOKENS_CEILING: u32 = 120_000;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default agent catalog location.
pub const DEFAULT_CATALOG_PATH: &str = "agents.yaml";

/// Clamps a requested token budget into `1..=MAX_TOKENS_CEILING`.
#[must_use]
pub const fn clamp_max_tokens(requested: u32) -> u32 {
    if requested == 0 {
        1
    } else if requested > MAX_TOKENS_CEILING {
        MAX_TOKENS_CEILING
    } else {
        requested
    }
}

/// Credential and endpoint for one provider.
#[derive(Clone, Default)]
pub struct ProviderSettings {
    /// API key, if configured.
    pub api_key: Option<String>,
    /// Optional base URL override (for proxies or test servers).
    pub base_url: Option<String>,
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Whether a provider has a key configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// The provider.
    pub provider: ProviderKind,
    /// `true` if an API key is present.
    pub configured: bool,
}

/// Configuration for providers and the orchestrator.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    providers: BTreeMap<ProviderKind, ProviderSettings>,
    /// Request timeout for providers without a fixed timeout.
    pub timeout: Duration,
    /// Path of the YAML agent catalog.
    pub catalog_path: PathBuf,
    /// Token budget used when a request does not set one.
    pub default_max_tokens: u32,
}

impl RuntimeConfig {
    /// Creates a new builder for `RuntimeConfig`.
    #[must_use]
    pub fn builder() -> RuntimeConfigBuilder {
        RuntimeConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if a numeric variable is zero.
    pub fn from_env() -> Result<Self, AgentError> {
        Self::builder().from_env().build()
    }

    /// Settings for one provider.
    #[must_use]
    pub fn provider(&self, kind: ProviderKind) -> ProviderSettings {
        self.providers.get(&kind).cloned().unwrap_or_default()
    }

    /// Key presence for every provider, in display order.
    #[must_use]
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .iter()
            .map(|&provider| ProviderStatus {
                provider,
                configured: self
                    .providers
                    .get(&provider)
                    .is_some_and(|s| s.api_key.is_some()),
            })
            .collect()
    }
}

/// Builder for [`RuntimeConfig`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfigBuilder {
    providers: BTreeMap<ProviderKind, ProviderSettings>,
    timeout: Option<Duration>,
    catalog_path: Option<PathBuf>,
    default_max_tokens: Option<u32>,
}

/// Reads a non-empty environment variable.
fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

const fn base_url_env(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::OpenAi => "OPENAI_BASE_URL",
        ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
        ProviderKind::Gemini => "GEMINI_BASE_URL",
        ProviderKind::Grok => "GROK_BASE_URL",
    }
}

impl RuntimeConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        for kind in ProviderKind::ALL {
            let entry = self.providers.entry(kind).or_default();
            if entry.api_key.is_none() {
                entry.api_key = env_non_empty(kind.key_env());
            }
            if entry.base_url.is_none() {
                entry.base_url = env_non_empty(base_url_env(kind));
            }
        }
        if self.timeout.is_none() {
            self.timeout = env_non_empty("AGENT_HQ_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs);
        }
        if self.catalog_path.is_none() {
            self.catalog_path = env_non_empty("AGENT_HQ_CATALOG").map(PathBuf::from);
        }
        if self.default_max_tokens.is_none() {
            self.default_max_tokens =
                env_non_empty("AGENT_HQ_MAX_TOKENS").and_then(|v| v.parse().ok());
        }
        self
    }

    /// Sets the API key for a provider. Empty keys are ignored.
    #[must_use]
    pub fn api_key(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        let key = key.into();
        if !key.trim().is_empty() {
            self.providers.entry(kind).or_default().api_key = Some(key);
        }
        self
    }

    /// Sets the base URL override for a provider.
    #[must_use]
    pub fn base_url(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        self.providers.entry(kind).or_default().base_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the agent catalog path.
    #[must_use]
    pub fn catalog_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Sets the default token budget.
    #[must_use]
    pub const fn default_max_tokens(mut self, n: u32) -> Self {
        self.default_max_tokens = Some(n);
        self
    }

    /// Builds the [`RuntimeConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidConfig`] if the default token budget or
    /// the timeout is zero.
    pub fn build(self) -> Result<RuntimeConfig, AgentError> {
        let default_max_tokens = self.default_max_tokens.unwrap_or(DEFAULT_MAX_TOKENS);
        if default_max_tokens == 0 {
            return Err(AgentError::InvalidConfig {
                message: "default max tokens must be positive".to_string(),
            });
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(AgentError::InvalidConfig {
                message: "timeout must be positive".to_string(),
            });
        }

        Ok(RuntimeConfig {
            providers: self.providers,
            timeout,
            catalog_path: self
                .catalog_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            default_max_tokens: clamp_max_tokens(default_max_tokens),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RuntimeConfig::builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.catalog_path, PathBuf::from(DEFAULT_CATALOG_PATH));
        assert_eq!(config.default_max_tokens, DEFAULT_MAX_TOKENS);
        assert!(config.provider(ProviderKind::OpenAi).api_key.is_none());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = RuntimeConfig::builder()
            .api_key(ProviderKind::Anthropic, "sk-ant")
            .base_url(ProviderKind::Grok, "http://localhost:9999")
            .timeout(Duration::from_secs(5))
            .catalog_path("custom.yaml")
            .default_max_tokens(500_000)
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(
            config.provider(ProviderKind::Anthropic).api_key.as_deref(),
            Some("sk-ant")
        );
        assert_eq!(
            config.provider(ProviderKind::Grok).base_url.as_deref(),
            Some("http://localhost:9999")
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.catalog_path, PathBuf::from("custom.yaml"));
        assert_eq!(config.default_max_tokens, MAX_TOKENS_CEILING);
    }

    #[test]
    fn test_builder_rejects_zero_tokens() {
        let result = RuntimeConfig::builder().default_max_tokens(0).build();
        assert!(matches!(result, Err(AgentError::InvalidConfig { .. })));
    }

    #[test]
    fn test_empty_key_is_absent() {
        let config = RuntimeConfig::builder()
            .api_key(ProviderKind::OpenAi, "   ")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(config.provider(ProviderKind::OpenAi).api_key.is_none());
    }

    #[test]
    fn test_provider_status() {
        let config = RuntimeConfig::builder()
            .api_key(ProviderKind::Gemini, "g-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let status = config.provider_status();
        assert_eq!(status.len(), 4);
        assert_eq!(status[0].provider, ProviderKind::OpenAi);
        assert!(!status[0].configured);
        assert!(status[2].configured);
    }

    #[test]
    fn test_clamp_max_tokens() {
        assert_eq!(clamp_max_tokens(0), 1);
        assert_eq!(clamp_max_tokens(128), 128);
        assert_eq!(clamp_max_tokens(u32::MAX), MAX_TOKENS_CEILING);
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = ProviderSettings {
            api_key: Some("super-secret".to_string()),
            base_url: None,
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
