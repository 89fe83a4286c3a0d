//! Provider registry and factory.
//!
//! Maps [`ProviderKind`] to concrete [`LlmProvider`] implementations. Providers
//! are built once and reused as stateless clients across calls.

use std::collections::HashMap;
use std::sync::Arc;

use crate::agent::config::RuntimeConfig;
use crate::agent::provider::{LlmProvider, ProviderKind};
use crate::error::AgentError;

/// Lookup from provider identity to implementation.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    /// Builds every provider compiled into this binary from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ApiRequest`] if an HTTP client cannot be built.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, AgentError> {
        let mut registry = Self::empty();
        for kind in ProviderKind::ALL {
            if let Some(provider) = create_provider(kind, config)? {
                registry.providers.insert(kind, provider);
            }
        }
        Ok(registry)
    }

    /// Registry with no providers.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the implementation for its provider kind.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Returns the implementation for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::LibraryUnavailable`] if `kind` has no registered
    /// implementation.
    pub fn get(&self, kind: ProviderKind) -> Result<Arc<dyn LlmProvider>, AgentError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or(AgentError::LibraryUnavailable { provider: kind })
    }

    /// Whether an implementation for `kind` is registered.
    #[must_use]
    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        f.debug_struct("ProviderRegistry")
            .field("providers", &kinds)
            .finish()
    }
}

/// Creates the [`LlmProvider`] for `kind`, or `None` when its cargo feature
/// is disabled.
///
/// # Errors
///
/// Returns [`AgentError::ApiRequest`] if the provider's HTTP client cannot be
/// built.
#[allow(clippy::unnecessary_wraps)]
pub fn create_provider(
    kind: ProviderKind,
    config: &RuntimeConfig,
) -> Result<Option<Arc<dyn LlmProvider>>, AgentError> {
    let settings = config.provider(kind);
    let provider: Option<Arc<dyn LlmProvider>> = match kind {
        #[cfg(feature = "openai")]
        ProviderKind::OpenAi => Some(Arc::new(
            crate::agent::providers::OpenAiProvider::new(&settings, config.timeout)?,
        )),
        #[cfg(feature = "anthropic")]
        ProviderKind::Anthropic => Some(Arc::new(
            crate::agent::providers::AnthropicProvider::new(&settings, config.timeout)?,
        )),
        #[cfg(feature = "gemini")]
        ProviderKind::Gemini => Some(Arc::new(
            crate::agent::providers::GeminiProvider::new(&settings, config.timeout)?,
        )),
        #[cfg(feature = "grok")]
        ProviderKind::Grok => Some(Arc::new(crate::agent::providers::GrokProvider::new(
            &settings,
        )?)),
        #[allow(unreachable_patterns)]
        _ => {
            let _ = settings;
            None
        }
    };
    Ok(provider)
}
