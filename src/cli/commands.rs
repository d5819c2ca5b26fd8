//! CLI command implementations.
//!
//! Contains the business logic for each CLI command.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::agent::{AgentConfig, ConversationMemory, ResearchAgent, create_provider};
use crate::cli::output::{OutputFormat, format_answer, format_status, format_turns};
use crate::cli::parser::{Cli, Commands};
use crate::core::RetentionPolicy;
use crate::credentials::{CredentialSource, Credentials, ProviderId};
use crate::error::{CommandError, ConfigError, InteractionError, Result};
use crate::interaction::{ChatOptions, Interaction, run_chat};
use crate::search::{SearchConfig, SerpApiSearch};
use crate::server::{self, AppState};
use crate::storage::{HistoryOrder, SqliteStorage, Storage};

/// Executes the CLI command.
///
/// # Arguments
///
/// * `cli` - Parsed CLI arguments.
///
/// # Returns
///
/// Output string to print to stdout.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);
    let db_path = cli.get_db_path();

    match &cli.command {
        Commands::Ask { question, history } => cmd_ask(cli, question, *history, format),
        Commands::Chat { history, quiet } => cmd_chat(
            cli,
            ChatOptions {
                history: *history,
                quiet: *quiet,
            },
        ),
        Commands::History {
            limit,
            oldest_first,
        } => cmd_history(&db_path, *limit, *oldest_first, format),
        Commands::Status => cmd_status(&db_path, parse_retention(&cli.retention)?, format),
        Commands::Serve { host, port } => cmd_serve(cli, host, *port),
    }
}

/// Parses the retention flag.
fn parse_retention(value: &str) -> Result<RetentionPolicy> {
    RetentionPolicy::parse(value).ok_or_else(|| {
        ConfigError::InvalidValue {
            name: "retention".to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

/// Opens the query log, creating the schema on first use.
fn open_storage(db_path: &Path) -> Result<SqliteStorage> {
    Ok(SqliteStorage::open_initialized(db_path)?)
}

/// Creates the tokio runtime used as the sync/async bridge.
fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}")).into()
    })
}

/// Loads credentials and wires agent, search tool and log together.
///
/// Credentials are checked first so a missing key fails before the log is
/// touched or any question is read.
fn build_interaction(cli: &Cli) -> Result<Interaction> {
    let retention = parse_retention(&cli.retention)?;
    let credentials = Credentials::load(&CredentialSource::from_option(cli.secrets.as_deref()))?;

    let agent_config = AgentConfig::builder()
        .api_key(credentials.get(ProviderId::ModelProvider))
        .from_env()
        .build()?;
    let search_config = SearchConfig::builder()
        .api_key(credentials.get(ProviderId::SearchProvider))
        .from_env()
        .build()?;
    debug!(?agent_config, ?search_config, "configuration resolved");

    let provider = create_provider(&agent_config)?;
    let search = SerpApiSearch::new(search_config)?;
    let agent = ResearchAgent::new(&agent_config, Arc::from(provider), Arc::new(search));

    let storage = open_storage(&cli.get_db_path())?;

    Ok(Interaction::new(Arc::new(agent), Arc::new(storage), retention))
}

fn cmd_ask(
    cli: &Cli,
    question: &str,
    history: Option<usize>,
    format: OutputFormat,
) -> Result<String> {
    let interaction = build_interaction(cli)?;
    let rt = runtime()?;

    let mut memory = ConversationMemory::new();
    let turn = match rt.block_on(interaction.handle_question(question, &mut memory)) {
        Ok(Some(turn)) => turn,
        Ok(None) => {
            return Err(CommandError::ExecutionFailed("question cannot be blank".to_string()).into());
        }
        Err(e @ InteractionError::Storage { .. }) => {
            // The answer exists; show it and report the logging failure.
            warn!(error = %e, "answer not logged");
            let _ = writeln!(io::stderr(), "Warning: {e}");
            return Ok(format!("{}\n", e.answer().unwrap_or_default()));
        }
        Err(e) => return Err(e.into()),
    };

    let recent = match history {
        Some(n) => interaction.storage().list_recent(n)?,
        None => Vec::new(),
    };
    Ok(format_answer(&turn, &recent, format))
}

fn cmd_chat(cli: &Cli, options: ChatOptions) -> Result<String> {
    let interaction = build_interaction(cli)?;
    let rt = runtime()?;

    let mut memory = ConversationMemory::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = rt
        .block_on(run_chat(
            &interaction,
            &mut memory,
            stdin.lock(),
            &mut stdout,
            options,
        ))
        .map_err(|e| CommandError::ExecutionFailed(format!("chat I/O failed: {e}")))?;

    debug!(
        answered = summary.answered,
        failed = summary.failed,
        "chat finished"
    );
    Ok(String::new())
}

fn cmd_history(
    db_path: &Path,
    limit: Option<usize>,
    oldest_first: bool,
    format: OutputFormat,
) -> Result<String> {
    let storage = open_storage(db_path)?;
    let turns = match limit {
        Some(n) => {
            let mut turns = storage.list_recent(n)?;
            if oldest_first {
                turns.reverse();
            }
            turns
        }
        None => storage.list_all(if oldest_first {
            HistoryOrder::OldestFirst
        } else {
            HistoryOrder::NewestFirst
        })?,
    };
    Ok(format_turns(&turns, format))
}

fn cmd_status(db_path: &Path, retention: RetentionPolicy, format: OutputFormat) -> Result<String> {
    let storage = open_storage(db_path)?;
    let stats = storage.stats()?;
    Ok(format_status(&stats, db_path, retention, format))
}

fn cmd_serve(cli: &Cli, host: &str, port: u16) -> Result<String> {
    let interaction = build_interaction(cli)?;
    let state = Arc::new(AppState::new(interaction));
    let rt = runtime()?;

    rt.block_on(server::serve(state, host, port))
        .map_err(|e| CommandError::ExecutionFailed(format!("server failed: {e}")))?;

    Ok(String::new())
}
