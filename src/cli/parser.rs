//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// agent-hq: keyword-routed LLM agents for medical device data work.
///
/// Routes free-text queries to named agents backed by OpenAI, Anthropic,
/// Gemini or Grok, and supports manual chaining of agent outputs.
#[derive(Parser, Debug)]
#[command(name = "agent-hq")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the YAML agent catalog.
    ///
    /// Defaults to `agents.yaml` in the current directory.
    #[arg(short, long, env = "AGENT_HQ_CATALOG", global = true)]
    pub catalog: Option<PathBuf>,

    /// Use the built-in agent set instead of a catalog file.
    #[arg(long, global = true, conflicts_with = "catalog")]
    pub builtin: bool,

    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send one query to an agent (routed by keyword unless --agent is set).
    #[command(after_help = r#"Examples:
  agent-hq ask "分析這筆資料"                        # Routed to nlp_analyzer
  agent-hq ask "check recall 2024-17" -a recall_manager
  agent-hq ask "summarize" -m claude-3-haiku-latest  # Model picks the provider
  agent-hq --format json ask "detect anomalies" | jq .response.text
"#)]
    Ask {
        /// Query text.
        query: String,

        /// Agent to use instead of keyword routing.
        #[arg(short, long)]
        agent: Option<String>,

        /// Model override.
        #[arg(short, long)]
        model: Option<String>,

        /// System prompt override.
        #[arg(short, long)]
        system: Option<String>,

        /// Output token budget (clamped to 1..=120000).
        #[arg(short = 't', long)]
        max_tokens: Option<u32>,
    },

    /// Show which agent a query would be routed to. Makes no API call.
    Route {
        /// Query text.
        query: String,
    },

    /// List the agents in the catalog.
    Agents,

    /// List the known models and their providers.
    Models,

    /// Show agent count and API key status per provider.
    Status,

    /// Interactive query loop with usage statistics.
    #[command(after_help = r"Commands inside the loop:
  /agent NAME     Pin queries to NAME (/agent alone returns to routing)
  /stats          Usage statistics
  /recent [N]     Last N calls, newest first (default 10)
  /quit           Exit
")]
    Chat {
        /// Start pinned to this agent.
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Interactive manual chaining of agent outputs.
    #[command(after_help = r"Commands inside the loop:
  /agent NAME     Agent for the next run
  /model M        Model override (/model alone clears it)
  /tokens N       Token budget
  /system TEXT    System prompt override (/system alone clears it)
  /run [TEXT]     Run on TEXT, or on the current input
  /show           Current input and last output
  /promote [TEXT] Make TEXT (or the last output) the next input
  /quit           Exit
Any other line replaces the current input.
")]
    Chain {
        /// Agent for the first run.
        #[arg(short, long)]
        agent: Option<String>,
    },
}
