//! Agent catalog: the per-agent configuration supplied at startup.
//!
//! The catalog is a YAML document with an `agents` mapping keyed by agent
//! name. Declaration order is preserved. A missing or unreadable catalog
//! degrades to an empty one via [`AgentCatalog::load_or_empty`].
//!
//! ```yaml
//! agents:
//!   recall_manager:
//!     llm_provider: anthropic
//!     model: claude-3-5-sonnet-latest
//!     system_prompt: You track medical device recalls.
//!     capabilities: [recall_tracking, notification]
//!     description: Recall tracking and notification
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AgentError;

/// Provider used when a catalog entry names none.
pub const DEFAULT_PROVIDER: &str = "openai";
/// Model used when a catalog entry names none.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Immutable configuration of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentConfig {
    /// Unique agent name.
    pub name: String,
    /// Provider identity as written in the catalog.
    pub provider: String,
    /// Default model.
    pub model: String,
    /// Default system prompt.
    pub system_prompt: String,
    /// Capability tags, in catalog order.
    pub capabilities: Vec<String>,
    /// Human-readable description.
    pub description: String,
}

impl AgentConfig {
    /// Config with catalog defaults for everything but the name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            system_prompt: String::new(),
            capabilities: Vec::new(),
            description: String::new(),
        }
    }

    /// Sets the provider identity.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    /// Sets the default model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the default system prompt.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Sets the capability tags.
    #[must_use]
    pub fn capabilities<I, S>(mut self, caps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = caps.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// One entry as it appears in the YAML document.
#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default = "default_provider")]
    llm_provider: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    system_prompt: String,
    #[serde(default)]
    capabilities: Vec<String>,
    #[serde(default)]
    description: String,
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Ordered collection of agent configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentCatalog {
    agents: Vec<AgentConfig>,
}

impl AgentCatalog {
    /// Builds a catalog from configs; a repeated name keeps its first entry.
    pub fn from_configs(configs: impl IntoIterator<Item = AgentConfig>) -> Self {
        let mut agents: Vec<AgentConfig> = Vec::new();
        for config in configs {
            if agents.iter().any(|a| a.name == config.name) {
                warn!(agent = %config.name, "duplicate agent name ignored");
                continue;
            }
            agents.push(config);
        }
        Self { agents }
    }

    /// Parses a YAML catalog document.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Catalog`] if the document is not valid YAML or an
    /// entry has the wrong shape.
    pub fn from_yaml(source: &str, origin: &str) -> Result<Self, AgentError> {
        let catalog_err = |message: String| AgentError::Catalog {
            path: origin.to_string(),
            message,
        };

        let doc: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| catalog_err(e.to_string()))?;

        let Some(agents) = doc.get("agents").and_then(serde_yaml::Value::as_mapping) else {
            return Ok(Self::default());
        };

        let mut configs = Vec::with_capacity(agents.len());
        for (key, value) in agents {
            let Some(name) = key.as_str() else {
                warn!(?key, "skipping agent with non-string name");
                continue;
            };
            let entry: CatalogEntry = if value.is_null() {
                serde_yaml::from_str("{}").map_err(|e| catalog_err(e.to_string()))?
            } else {
                serde_yaml::from_value(value.clone())
                    .map_err(|e| catalog_err(format!("agent {name}: {e}")))?
            };
            configs.push(AgentConfig {
                name: name.to_string(),
                provider: entry.llm_provider,
                model: entry.model,
                system_prompt: entry.system_prompt,
                capabilities: entry.capabilities,
                description: entry.description,
            });
        }

        Ok(Self::from_configs(configs))
    }

    /// Loads a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Catalog`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, AgentError> {
        let origin = path.display().to_string();
        let source = std::fs::read_to_string(path).map_err(|e| AgentError::Catalog {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        let catalog = Self::from_yaml(&source, &origin)?;
        info!(path = %origin, agents = catalog.len(), "loaded agent catalog");
        Ok(catalog)
    }

    /// Loads a catalog file, degrading to an empty catalog on any failure.
    #[must_use]
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!(error = %e, "agent catalog unavailable, starting with no agents");
            Self::default()
        })
    }

    /// Built-in GUDID agent set matching the router's keyword table.
    #[must_use]
    pub fn builtin() -> Self {
        const BUILTIN: &[(&str, &str, &str, &[&str])] = &[
            (
                "nlp_analyzer",
                "NLP Analyzer",
                "You analyze free-text medical device records and extract entities such as device names, manufacturers and identifiers.",
                &["entity_extraction", "text_analysis"],
            ),
            (
                "anomaly_detector",
                "Anomaly Detector",
                "You detect anomalies and inconsistencies in medical device registration data.",
                &["anomaly_detection", "data_quality"],
            ),
            (
                "duplicate_checker",
                "Duplicate Checker",
                "You find duplicate or near-duplicate device records and explain the similarity.",
                &["deduplication", "similarity"],
            ),
            (
                "label_matcher",
                "Label Matcher",
                "You compare device labels and OCR output against registered device data.",
                &["label_matching", "ocr"],
            ),
            (
                "data_standardizer",
                "Data Standardizer",
                "You normalize device data into standard formats and controlled vocabularies.",
                &["standardization", "normalization"],
            ),
            (
                "adverse_event_linker",
                "Adverse Event Linker",
                "You link adverse event reports to the devices they concern.",
                &["adverse_events", "linking"],
            ),
            (
                "recall_manager",
                "Recall Manager",
                "You track medical device recalls and summarize their scope and status.",
                &["recall_tracking"],
            ),
            (
                "eifu_manager",
                "eIFU Manager",
                "You manage electronic instructions for use and answer questions about them.",
                &["eifu", "documentation"],
            ),
            (
                "customs_verifier",
                "Customs Verifier",
                "You verify customs declarations and packing lists against device registrations.",
                &["customs", "verification"],
            ),
            (
                "international_connector",
                "International Connector",
                "You map device records to international registries and keep them in sync.",
                &["international", "synchronization"],
            ),
        ];

        Self::from_configs(BUILTIN.iter().map(|&(name, description, prompt, caps)| {
            AgentConfig::new(name)
                .system_prompt(prompt)
                .capabilities(caps.iter().copied())
                .description(description)
        }))
    }

    /// Agent configurations in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentConfig> {
        self.agents.iter()
    }

    /// Number of agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the catalog has no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl IntoIterator for AgentCatalog {
    type Item = AgentConfig;
    type IntoIter = std::vec::IntoIter<AgentConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.agents.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r"
agents:
  recall_manager:
    llm_provider: anthropic
    model: claude-3-5-sonnet-latest
    system_prompt: You track recalls.
    capabilities: [recall_tracking, notification]
    description: Recall tracking
  nlp_analyzer:
    system_prompt: You analyze text.
";

    #[test]
    fn test_from_yaml_preserves_order_and_defaults() {
        let catalog = AgentCatalog::from_yaml(SAMPLE, "inline").unwrap_or_default();
        let names: Vec<_> = catalog.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["recall_manager", "nlp_analyzer"]);

        let recall = catalog.iter().next().cloned().unwrap_or_else(|| AgentConfig::new("x"));
        assert_eq!(recall.provider, "anthropic");
        assert_eq!(recall.capabilities, ["recall_tracking", "notification"]);

        let nlp = catalog.iter().nth(1).cloned().unwrap_or_else(|| AgentConfig::new("x"));
        assert_eq!(nlp.provider, DEFAULT_PROVIDER);
        assert_eq!(nlp.model, DEFAULT_MODEL);
        assert!(nlp.capabilities.is_empty());
    }

    #[test]
    fn test_from_yaml_without_agents_key() {
        let catalog = AgentCatalog::from_yaml("version: 1\n", "inline").unwrap_or_default();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_from_yaml_null_entry_uses_defaults() {
        let catalog = AgentCatalog::from_yaml("agents:\n  bare:\n", "inline").unwrap_or_default();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.iter().next().map(|a| a.model.as_str()), Some(DEFAULT_MODEL));
    }

    #[test]
    fn test_from_yaml_invalid() {
        let result = AgentCatalog::from_yaml("agents: [unclosed", "inline");
        assert!(matches!(result, Err(AgentError::Catalog { .. })));
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let catalog = AgentCatalog::load_or_empty(Path::new("/nonexistent/agents.yaml"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap_or_else(|_| unreachable!());
        file.write_all(SAMPLE.as_bytes())
            .unwrap_or_else(|_| unreachable!());
        let catalog = AgentCatalog::load(file.path()).unwrap_or_default();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let catalog = AgentCatalog::from_configs([
            AgentConfig::new("a").model("first"),
            AgentConfig::new("a").model("second"),
        ]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.iter().next().map(|a| a.model.as_str()), Some("first"));
    }

    #[test]
    fn test_builtin_has_ten_agents() {
        let catalog = AgentCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.iter().all(|a| a.provider == DEFAULT_PROVIDER));
    }
}
