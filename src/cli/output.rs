//! Output formatting for CLI commands.
//!
//! Text output is for humans; JSON is pretty-printed and NDJSON is one
//! compact object per line for piping into `jq` and friends.

use std::fmt::Write as FmtWrite;

use serde::Serialize;

use crate::agent::catalog::AgentConfig;
use crate::agent::config::ProviderStatus;
use crate::agent::history::{History, HistoryRecord};
use crate::agent::models::ModelEntry;
use crate::agent::orchestrator::QueryOutcome;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
    /// Newline-delimited compact JSON.
    Ndjson,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognized means text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Serializes `value` for the JSON formats.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(self, value: &T) -> String {
        let rendered = match self {
            Self::Ndjson => serde_json::to_string(value),
            Self::Text | Self::Json => serde_json::to_string_pretty(value),
        };
        rendered.unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Serializes a list: an array for JSON, one line per item for NDJSON.
    #[must_use]
    pub fn to_json_list<T: Serialize>(self, items: &[T]) -> String {
        match self {
            Self::Ndjson => items.iter().fold(String::new(), |mut out, item| {
                out.push_str(&self.to_json(item));
                out.push('\n');
                out
            }),
            Self::Text | Self::Json => self.to_json(items),
        }
    }
}

/// Formats a query outcome with its caption.
#[must_use]
pub fn format_outcome(outcome: &QueryOutcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let tokens = match outcome.response.usage.total_tokens {
                0 => String::new(),
                n => format!(" | Tokens: {n}"),
            };
            format!(
                "{}\n\n---\nAgent: {} | Model: {}{tokens}\n",
                outcome.response.text, outcome.agent_name, outcome.model
            )
        }
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json(outcome),
    }
}

/// Formats the agent catalog.
#[must_use]
pub fn format_agents(agents: &[&AgentConfig], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if agents.is_empty() {
                return "No agents configured.\n".to_string();
            }
            let mut output = String::new();
            for agent in agents {
                let _ = writeln!(output, "{}", agent.name);
                if !agent.description.is_empty() {
                    let _ = writeln!(output, "  Description:  {}", agent.description);
                }
                let _ = writeln!(output, "  Provider:     {}", agent.provider);
                let _ = writeln!(output, "  Model:        {}", agent.model);
                if !agent.capabilities.is_empty() {
                    let _ = writeln!(output, "  Capabilities: {}", agent.capabilities.join(", "));
                }
                if !agent.system_prompt.is_empty() {
                    let _ = writeln!(output, "  Prompt:       {}", agent.system_prompt);
                }
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json_list(agents),
    }
}

/// Formats the model table.
#[must_use]
pub fn format_models(models: &[ModelEntry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let width = models.iter().map(|m| m.model.len()).max().unwrap_or(0);
            models.iter().fold(String::new(), |mut out, m| {
                let _ = writeln!(out, "{:<width$}  {}", m.model, m.provider);
                out
            })
        }
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json_list(models),
    }
}

#[derive(Serialize)]
struct StatusReport<'a> {
    agents: usize,
    providers: &'a [ProviderStatus],
}

/// Formats agent count and provider key status.
#[must_use]
pub fn format_status(agents: usize, providers: &[ProviderStatus], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!("Agents: {agents}\n");
            for status in providers {
                let badge = if status.configured {
                    "configured"
                } else {
                    "not configured"
                };
                let _ = writeln!(output, "  {:<12} {badge}", status.provider.display_name());
            }
            output
        }
        OutputFormat::Json | OutputFormat::Ndjson => {
            format.to_json(&StatusReport { agents, providers })
        }
    }
}

/// Formats the usage statistics of a history.
#[must_use]
pub fn format_stats(history: &History) -> String {
    let mut output = format!(
        "Total queries: {}\nActive agents: {}\n",
        history.len(),
        history.active_agents()
    );
    if let Some(top) = history.most_used_agent() {
        let _ = writeln!(output, "Most used:     {top}");
    }
    for usage in history.usage_counts() {
        let _ = writeln!(output, "  {:<24} {}", usage.agent_name, usage.count);
    }
    output
}

/// Formats history records, one block per record.
#[must_use]
pub fn format_records<'a>(records: impl IntoIterator<Item = &'a HistoryRecord>) -> String {
    let mut output = String::new();
    for record in records {
        let _ = writeln!(
            output,
            "[{}] {} ({})\n  Q: {}\n  A: {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.agent_name,
            record.model,
            record.query,
            truncate(&record.response, 200)
        );
    }
    if output.is_empty() {
        output.push_str("No queries yet.\n");
    }
    output
}

/// Truncates to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
