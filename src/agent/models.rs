//! Known model identifiers and the provider each belongs to.
//!
//! Agents consult this table when a caller overrides the model: naming a
//! model that belongs to another backend redirects the call to it.

use serde::Serialize;

use super::provider::ProviderKind;

/// Built-in model table, in picker order.
const BUILTIN_MODELS: &[(&str, ProviderKind)] = &[
    ("gpt-4o-mini", ProviderKind::OpenAi),
    ("gpt-4.1-mini", ProviderKind::OpenAi),
    ("gemini-2.5-flash", ProviderKind::Gemini),
    ("gemini-2.5-flash-lite", ProviderKind::Gemini),
    ("claude-3-5-sonnet-latest", ProviderKind::Anthropic),
    ("claude-3-haiku-latest", ProviderKind::Anthropic),
    ("grok-4-fast-reasoning", ProviderKind::Grok),
    ("grok-3-mini", ProviderKind::Grok),
];

/// One row of the model table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    /// Model identifier as sent to the provider.
    pub model: String,
    /// Provider serving the model.
    pub provider: ProviderKind,
}

/// Read-only model → provider lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::from_entries(
            BUILTIN_MODELS
                .iter()
                .map(|&(model, provider)| (model.to_string(), provider)),
        )
    }
}

impl ModelCatalog {
    /// Builds a catalog; the first entry for a model wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, ProviderKind)>) -> Self {
        let mut out: Vec<ModelEntry> = Vec::new();
        for (model, provider) in entries {
            if !out.iter().any(|e| e.model == model) {
                out.push(ModelEntry { model, provider });
            }
        }
        Self { entries: out }
    }

    /// Provider that serves `model`, if it is a known identifier.
    #[must_use]
    pub fn provider_for(&self, model: &str) -> Option<ProviderKind> {
        self.entries
            .iter()
            .find(|e| e.model == model)
            .map(|e| e.provider)
    }

    /// Known models in declaration order.
    #[must_use]
    pub fn models(&self) -> &[ModelEntry] {
        &self.entries
    }
}
