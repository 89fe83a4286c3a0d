//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::io::{self, IsTerminal};

use rustyline::DefaultEditor;
use tracing::debug;

use crate::agent::catalog::AgentCatalog;
use crate::agent::client::ProviderRegistry;
use crate::agent::config::RuntimeConfig;
use crate::agent::models::ModelCatalog;
use crate::agent::orchestrator::{Orchestrator, QueryRequest};
use crate::agent::router::Router;
use crate::cli::output::{
    OutputFormat, format_agents, format_models, format_outcome, format_status,
};
use crate::cli::parser::{Cli, Commands};
use crate::cli::repl::{LineSource, ReaderSource, run_chain, run_chat};
use crate::error::{CommandError, Result};

/// Parameters for the ask command.
#[derive(Debug, Clone, Default)]
pub struct AskParams<'a> {
    /// Query text.
    pub query: &'a str,
    /// Agent to use instead of routing.
    pub agent: Option<&'a str>,
    /// Model override.
    pub model: Option<&'a str>,
    /// System prompt override.
    pub system: Option<&'a str>,
    /// Output token budget.
    pub max_tokens: Option<u32>,
}

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Route { query } => Ok(cmd_route(query, format)),
        Commands::Models => Ok(format_models(ModelCatalog::default().models(), format)),
        Commands::Agents => {
            let catalog = load_catalog(cli, &runtime_config(cli)?);
            Ok(format_agents(&catalog.iter().collect::<Vec<_>>(), format))
        }
        Commands::Status => {
            let config = runtime_config(cli)?;
            let catalog = load_catalog(cli, &config);
            Ok(format_status(
                catalog.len(),
                &config.provider_status(),
                format,
            ))
        }
        Commands::Ask {
            query,
            agent,
            model,
            system,
            max_tokens,
        } => {
            let params = AskParams {
                query,
                agent: agent.as_deref(),
                model: model.as_deref(),
                system: system.as_deref(),
                max_tokens: *max_tokens,
            };
            cmd_ask(cli, &params, format)
        }
        Commands::Chat { agent } => {
            let mut orchestrator = build_orchestrator(cli)?;
            let rt = runtime()?;
            with_line_source(|input| {
                run_chat(&rt, &mut orchestrator, input, &mut io::stdout(), agent.clone(), format)
            })?;
            Ok(String::new())
        }
        Commands::Chain { agent } => {
            let mut orchestrator = build_orchestrator(cli)?;
            let rt = runtime()?;
            with_line_source(|input| {
                run_chain(&rt, &mut orchestrator, input, &mut io::stdout(), agent.clone())
            })?;
            Ok(String::new())
        }
    }
}

/// Runs `f` with a rustyline editor when stdin is a terminal, otherwise
/// with plain buffered stdin.
fn with_line_source<F>(f: F) -> Result<()>
where
    F: FnOnce(&mut dyn LineSource) -> Result<()>,
{
    if io::stdin().is_terminal() {
        let mut editor = DefaultEditor::new().map_err(|e| {
            CommandError::ExecutionFailed(format!("Failed to open line editor: {e}"))
        })?;
        f(&mut editor)
    } else {
        f(&mut ReaderSource::new(io::stdin().lock()))
    }
}

/// Resolves runtime configuration from the environment.
fn runtime_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut builder = RuntimeConfig::builder();
    if let Some(path) = &cli.catalog {
        builder = builder.catalog_path(path.clone());
    }
    builder
        .from_env()
        .build()
        .map_err(|e| CommandError::ExecutionFailed(format!("Configuration error: {e}")))
}

/// Built-in agents with `--builtin`, otherwise the catalog file (empty if
/// it is missing or unreadable).
fn load_catalog(cli: &Cli, config: &RuntimeConfig) -> AgentCatalog {
    if cli.builtin {
        AgentCatalog::builtin()
    } else {
        AgentCatalog::load_or_empty(&config.catalog_path)
    }
}

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let config = runtime_config(cli)?;
    let catalog = load_catalog(cli, &config);
    let providers = ProviderRegistry::from_config(&config).map_err(|e| {
        CommandError::ExecutionFailed(format!("Provider creation failed: {e}"))
    })?;
    debug!(?providers, agents = catalog.len(), "building orchestrator");
    Ok(Orchestrator::new(catalog, providers).default_max_tokens(config.default_max_tokens))
}

/// Creates the tokio runtime used as the sync/async bridge.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })
}

fn cmd_route(query: &str, format: OutputFormat) -> String {
    let agent = Router::default().route(query).to_string();
    match format {
        OutputFormat::Text => format!("{agent}\n"),
        OutputFormat::Json | OutputFormat::Ndjson => format.to_json(&serde_json::json!({
            "query": query,
            "agent": agent,
        })),
    }
}

fn cmd_ask(cli: &Cli, params: &AskParams<'_>, format: OutputFormat) -> Result<String> {
    let mut orchestrator = build_orchestrator(cli)?;

    let mut request = QueryRequest::new(params.query);
    request.agent = params.agent.map(String::from);
    request.model_override = params.model.map(String::from);
    request.system_prompt_override = params.system.map(String::from);
    request.max_tokens = params.max_tokens;

    let rt = runtime()?;
    let outcome = rt.block_on(orchestrator.process_query(request))?;
    Ok(format_outcome(&outcome, format))
}
