//! CLI layer for agent-hq.
//!
//! Provides the command-line interface using clap, with one-shot commands
//! for asking, routing and inspecting the catalog, and interactive `chat`
//! and `chain` loops.

pub mod commands;
pub mod output;
pub mod parser;
pub mod repl;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
