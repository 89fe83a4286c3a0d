//! Interactive `chat` and `chain` loops.
//!
//! Both loops read commands from a [`LineSource`] and write to any
//! [`Write`]. On a terminal the source is a rustyline editor with history;
//! piped input and tests use [`ReaderSource`]. Async calls are bridged with
//! the caller's tokio runtime.

use std::io::{self, BufRead, Write};

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::runtime::Runtime;

use crate::agent::chain::{ChainSession, ChainStep};
use crate::agent::orchestrator::{Orchestrator, QueryRequest};
use crate::agent::router::DEFAULT_AGENT;
use crate::cli::output::{OutputFormat, format_outcome, format_records, format_stats};
use crate::error::Result;

/// Records shown by `/recent` without an argument.
const DEFAULT_RECENT: usize = 10;

/// Where the loops read their lines from.
pub trait LineSource {
    /// Shows `prompt` and reads one line without its terminator. `None`
    /// means end of input.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error.
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.add_history_entry(line.as_str())
                        .map_err(io::Error::other)?;
                }
                Ok(Some(line))
            }
            // Ctrl-C abandons the current line only.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }
}

/// Line source over a plain reader. Prompts are not echoed.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    /// Wraps `reader`.
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self, _prompt: &str) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

fn prompt(agent: Option<&str>) -> String {
    format!("{}> ", agent.unwrap_or(""))
}

/// Splits `/cmd rest` into the command and its trimmed argument.
fn split_command(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('/')?;
    let (cmd, arg) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Some((cmd, arg.trim()))
}

/// Runs the chat loop until `/quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading or writing the terminal streams fails.
pub fn run_chat<L: LineSource + ?Sized, W: Write>(
    rt: &Runtime,
    orchestrator: &mut Orchestrator,
    input: &mut L,
    output: &mut W,
    pinned: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut pinned = pinned.filter(|a| !a.is_empty());
    writeln!(
        output,
        "agent-hq chat ({} agents). /agent NAME, /stats, /recent [N], /quit",
        orchestrator.agents().len()
    )?;
    output.flush()?;

    while let Some(line) = input.read_line(&prompt(pinned.as_deref()))? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match split_command(line) {
            Some(("quit" | "exit", _)) => break,
            Some(("agent", "")) => {
                pinned = None;
                writeln!(output, "Routing by keyword.")?;
            }
            Some(("agent", name)) => {
                if orchestrator.agent(name).is_none() {
                    writeln!(output, "Warning: agent {name} is not in the catalog.")?;
                }
                pinned = Some(name.to_string());
                writeln!(output, "Pinned to {name}.")?;
            }
            Some(("stats", _)) => write!(output, "{}", format_stats(orchestrator.history()))?,
            Some(("recent", arg)) => {
                let n = if arg.is_empty() {
                    Some(DEFAULT_RECENT)
                } else {
                    arg.parse().ok()
                };
                match n {
                    Some(n) => write!(output, "{}", format_records(orchestrator.history().recent(n)))?,
                    None => writeln!(output, "Usage: /recent [N]")?,
                }
            }
            Some((cmd, _)) => writeln!(output, "Unknown command: /{cmd}")?,
            None => {
                let mut request = QueryRequest::new(line);
                request.agent.clone_from(&pinned);
                match rt.block_on(orchestrator.process_query(request)) {
                    Ok(outcome) => writeln!(output, "{}", format_outcome(&outcome, format).trim_end())?,
                    Err(e) => writeln!(output, "Error: {e}")?,
                }
            }
        }
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}

/// Runs the chain loop until `/quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading or writing the terminal streams fails.
pub fn run_chain<L: LineSource + ?Sized, W: Write>(
    rt: &Runtime,
    orchestrator: &mut Orchestrator,
    input: &mut L,
    output: &mut W,
    agent: Option<String>,
) -> Result<()> {
    let mut step = ChainStep::new(agent.unwrap_or_else(|| DEFAULT_AGENT.to_string()));
    let mut session = ChainSession::new();
    writeln!(
        output,
        "agent-hq chain. Type input, then /run; /promote feeds the output forward. /quit exits."
    )?;
    output.flush()?;

    while let Some(line) = input.read_line(&prompt(Some(&step.agent)))? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match split_command(trimmed) {
            Some(("quit" | "exit", _)) => break,
            Some(("agent", "")) => writeln!(output, "Usage: /agent NAME")?,
            Some(("agent", name)) => {
                step.agent = name.to_string();
                writeln!(output, "Agent: {name}")?;
            }
            Some(("model", m)) => {
                step.model = (!m.is_empty()).then(|| m.to_string());
                writeln!(output, "Model: {}", step.model.as_deref().unwrap_or("(agent default)"))?;
            }
            Some(("tokens", n)) => match n.parse::<u32>() {
                Ok(n) if n > 0 => {
                    step.max_tokens = Some(n);
                    writeln!(output, "Max tokens: {n}")?;
                }
                _ => writeln!(output, "Usage: /tokens N (N > 0)")?,
            },
            Some(("system", text)) => {
                step.system_prompt = (!text.is_empty()).then(|| text.to_string());
                writeln!(
                    output,
                    "System prompt: {}",
                    step.system_prompt.as_deref().unwrap_or("(agent default)")
                )?;
            }
            Some(("run", text)) => {
                let text = if text.is_empty() {
                    session.current_input().to_string()
                } else {
                    text.to_string()
                };
                match rt.block_on(session.run(orchestrator, &step, &text)) {
                    Ok(answer) => writeln!(output, "{answer}\n\n---\nAgent: {}", step.agent)?,
                    Err(e) => writeln!(output, "Error: {e}")?,
                }
            }
            Some(("show", _)) => writeln!(
                output,
                "Input:\n{}\n\nOutput:\n{}",
                session.current_input(),
                session.last_output()
            )?,
            Some(("promote", text)) => {
                let text = if text.is_empty() {
                    session.last_output().to_string()
                } else {
                    text.to_string()
                };
                session.promote(text);
                writeln!(output, "Promoted to input.")?;
            }
            Some((cmd, _)) => writeln!(output, "Unknown command: /{cmd}")?,
            None => {
                session.promote(line.as_str());
                writeln!(output, "Input set.")?;
            }
        }
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}
