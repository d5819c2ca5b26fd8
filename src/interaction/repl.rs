//! Line-oriented chat loop.
//!
//! Generic over input and output so the same loop drives a terminal and
//! in-memory buffers in tests.

use std::io::{BufRead, Write};

use tracing::debug;

use super::Interaction;
use crate::agent::ConversationMemory;

/// Prompt written before each line of input.
pub const PROMPT: &str = "> ";

/// Options for [`run_chat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatOptions {
    /// Redisplay this many recent turns after each answer.
    pub history: Option<usize>,
    /// Suppress the `> ` prompt (for piped input).
    pub quiet: bool,
}

/// Summary of a finished chat session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatSummary {
    /// Questions that produced an answer.
    pub answered: usize,
    /// Questions that failed.
    pub failed: usize,
}

/// Returns `true` for the words that end a chat session.
#[must_use]
pub fn is_exit_command(line: &str) -> bool {
    let line = line.trim();
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

/// Runs the chat loop until `exit`/`quit` or end of input.
///
/// Blank lines are skipped. Failures are written to `output` and the loop
/// keeps going; only I/O errors on `input`/`output` end it early.
///
/// # Errors
///
/// Returns an I/O error if reading input or writing output fails.
pub async fn run_chat<R: BufRead, W: Write>(
    interaction: &Interaction,
    memory: &mut ConversationMemory,
    mut input: R,
    output: &mut W,
    options: ChatOptions,
) -> std::io::Result<ChatSummary> {
    let mut summary = ChatSummary::default();
    let mut line = String::new();

    loop {
        if !options.quiet {
            write!(output, "{PROMPT}")?;
            output.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            break;
        }
        if is_exit_command(&line) {
            break;
        }

        match interaction.handle_question(&line, memory).await {
            Ok(None) => continue,
            Ok(Some(turn)) => {
                summary.answered += 1;
                writeln!(output, "{}", turn.answer)?;
            }
            Err(e) => {
                if let Some(answer) = e.answer() {
                    summary.answered += 1;
                    writeln!(output, "{answer}")?;
                } else {
                    summary.failed += 1;
                }
                writeln!(output, "Error: {e}")?;
            }
        }

        if let Some(n) = options.history {
            write_history(interaction, n, output)?;
        }
    }

    Ok(summary)
}

fn write_history<W: Write>(interaction: &Interaction, n: usize, output: &mut W) -> std::io::Result<()> {
    match interaction.storage().list_recent(n) {
        Ok(turns) if turns.is_empty() => Ok(()),
        Ok(turns) => {
            writeln!(output, "\n--- Recent history ---")?;
            for turn in &turns {
                writeln!(output, "{turn}\n")?;
            }
            Ok(())
        }
        Err(e) => writeln!(output, "Error: cannot read history: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetentionPolicy;
    use crate::interaction::tests::{ScriptedAgent, memory_storage};
    use crate::storage::Storage;

    use std::io::Cursor;
    use std::sync::Arc;

    use test_case::test_case;

    fn interaction(storage: Arc<crate::storage::SqliteStorage>) -> Interaction {
        let agent = Arc::new(ScriptedAgent::new(&[
            ("What is the capital of France?", "Paris."),
            ("And of Italy?", "Rome."),
        ]));
        Interaction::new(agent, storage, RetentionPolicy::Answered)
    }

    async fn run(interaction: &Interaction, script: &str, options: ChatOptions) -> (ChatSummary, String) {
        let mut memory = ConversationMemory::new();
        let mut out = Vec::new();
        let summary = run_chat(
            interaction,
            &mut memory,
            Cursor::new(script.to_string()),
            &mut out,
            options,
        )
        .await
        .unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[test_case("exit" ; "lowercase exit")]
    #[test_case("QUIT" ; "uppercase quit")]
    #[test_case("  Exit \n" ; "padded exit")]
    fn test_exit_commands(line: &str) {
        assert!(is_exit_command(line));
    }

    #[test_case("exit now" ; "trailing words")]
    #[test_case("" ; "empty")]
    #[test_case("exiting" ; "prefix")]
    fn test_not_exit_commands(line: &str) {
        assert!(!is_exit_command(line));
    }

    #[tokio::test]
    async fn test_exit_keeps_prior_turns() {
        let storage = memory_storage();
        let interaction = interaction(storage.clone());

        let (summary, out) = run(
            &interaction,
            "What is the capital of France?\nAnd of Italy?\nexit\nnever asked\n",
            ChatOptions::default(),
        )
        .await;

        assert_eq!(summary.answered, 2);
        assert!(out.contains("Paris."));
        assert!(out.contains("Rome."));
        let turns = storage.list_recent(10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].question, "And of Italy?");
    }

    #[tokio::test]
    async fn test_eof_ends_loop() {
        let storage = memory_storage();
        let interaction = interaction(storage.clone());

        let (summary, _) = run(
            &interaction,
            "What is the capital of France?",
            ChatOptions::default(),
        )
        .await;

        assert_eq!(summary.answered, 1);
        assert_eq!(storage.stats().unwrap().turns, 1);
    }

    #[tokio::test]
    async fn test_blank_lines_skipped_and_errors_continue() {
        let storage = memory_storage();
        let interaction = interaction(storage.clone());

        let (summary, out) = run(
            &interaction,
            "\n   \nunknown question\nWhat is the capital of France?\n",
            ChatOptions {
                quiet: true,
                ..ChatOptions::default()
            },
        )
        .await;

        assert_eq!(summary, ChatSummary { answered: 1, failed: 1 });
        assert!(out.contains("Error: could not answer \"unknown question\""));
        assert!(out.contains("Paris."));
        assert!(!out.contains(PROMPT));
        assert_eq!(storage.stats().unwrap().turns, 1);
    }

    #[tokio::test]
    async fn test_history_redisplayed_after_answer() {
        let storage = memory_storage();
        let interaction = interaction(storage);

        let (_, out) = run(
            &interaction,
            "What is the capital of France?\nAnd of Italy?\n",
            ChatOptions {
                history: Some(1),
                quiet: true,
            },
        )
        .await;

        assert_eq!(out.matches("--- Recent history ---").count(), 2);
        assert!(out.contains("Q: And of Italy?\nA: Rome."));
    }
}
