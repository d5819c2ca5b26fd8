//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::server::{DEFAULT_HOST, DEFAULT_PORT};

/// Research assistant: ask questions answered by a chat model with web search.
///
/// Every answered question is appended to a local query log.
#[derive(Parser, Debug)]
#[command(name = "research-assistant")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the query log database.
    ///
    /// Defaults to `.research-assistant/qa.db` in the current directory.
    #[arg(short, long, env = "RA_DB_PATH", global = true)]
    pub db_path: Option<PathBuf>,

    /// Path to the secrets file.
    ///
    /// Defaults to `.research-assistant/secrets.toml`; keys may also come
    /// from `OPENAI_API_KEY` and `SERPAPI_API_KEY`.
    #[arg(long, env = "RA_SECRETS_PATH", global = true)]
    pub secrets: Option<PathBuf>,

    /// Which questions are written to the log (answered, all, off).
    #[arg(long, env = "RA_RETENTION", default_value = "answered", global = true)]
    pub retention: String,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the answer.
    #[command(after_help = r#"Examples:
  research-assistant ask "What is the capital of France?"
  research-assistant ask "Latest Rust release?" --history 3
  research-assistant --format json ask "Who wrote Dune?" | jq .answer
"#)]
    Ask {
        /// The question.
        question: String,

        /// Also show this many recent log entries.
        #[arg(long)]
        history: Option<usize>,
    },

    /// Interactive question loop. Type `exit` or `quit` to leave.
    #[command(after_help = r#"Examples:
  research-assistant chat
  research-assistant chat --history 5
  printf 'Who wrote Dune?\nexit\n' | research-assistant chat --quiet
"#)]
    Chat {
        /// Redisplay this many recent log entries after each answer.
        #[arg(long)]
        history: Option<usize>,

        /// Do not print the input prompt.
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show logged questions and answers.
    #[command(after_help = r#"Examples:
  research-assistant history              # Everything, newest first
  research-assistant history -n 5         # Five most recent
  research-assistant history --oldest-first
  research-assistant history -n 5 --oldest-first   # Five most recent, in order asked
"#)]
    History {
        /// Maximum number of entries.
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// List oldest entries first.
        #[arg(long)]
        oldest_first: bool,
    },

    /// Show query log statistics.
    Status,

    /// Serve the web form.
    #[command(after_help = r#"Examples:
  research-assistant serve
  research-assistant serve --host 0.0.0.0 --port 8080
"#)]
    Serve {
        /// Host to bind.
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on.
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

impl Cli {
    /// Returns the database path, using the default if not specified.
    #[must_use]
    pub fn get_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::storage::DEFAULT_DB_PATH))
    }
}
