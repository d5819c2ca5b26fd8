//! CLI layer for research-assistant.
//!
//! Provides the command-line interface using clap, with commands for
//! asking questions, chatting, browsing the log and serving the web form.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
