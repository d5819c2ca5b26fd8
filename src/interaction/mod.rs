//! Interaction loop: question in, answer out, turn logged.
//!
//! [`Interaction`] holds the process-wide collaborators (agent, log,
//! retention policy). Per-session state lives in the caller's
//! [`ConversationMemory`], so one instance serves any number of sessions.

pub mod repl;

pub use repl::{ChatOptions, ChatSummary, is_exit_command, run_chat};

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{debug, warn};

use crate::agent::{AnsweringAgent, ConversationMemory};
use crate::core::{RetentionPolicy, Turn};
use crate::error::InteractionError;
use crate::storage::Storage;

/// Longest question accepted, in bytes.
pub const MAX_QUESTION_LEN: usize = 10_000;

/// Routes questions to the agent and records the outcome.
#[derive(Clone)]
pub struct Interaction {
    agent: Arc<dyn AnsweringAgent>,
    storage: Arc<dyn Storage>,
    retention: RetentionPolicy,
}

impl Interaction {
    /// Creates an interaction loop over the given agent and log.
    #[must_use]
    pub fn new(
        agent: Arc<dyn AnsweringAgent>,
        storage: Arc<dyn Storage>,
        retention: RetentionPolicy,
    ) -> Self {
        Self {
            agent,
            storage,
            retention,
        }
    }

    /// The query log this loop writes to.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Active retention policy.
    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Handles one submitted question.
    ///
    /// Blank input yields `Ok(None)` without calling the agent. On success
    /// the exchange is logged (per the retention policy), recorded in
    /// `memory`, and returned. Under [`RetentionPolicy::Off`] the returned
    /// turn has id `0`.
    ///
    /// # Errors
    ///
    /// - [`InteractionError::QuestionTooLong`] before any agent call.
    /// - [`InteractionError::Provider`] when the agent fails; `memory` is
    ///   untouched and nothing is logged unless the policy is
    ///   [`RetentionPolicy::All`].
    /// - [`InteractionError::Storage`] when the answer could not be logged;
    ///   the answer is carried in the error and `memory` still records it.
    pub async fn handle_question(
        &self,
        question: &str,
        memory: &mut ConversationMemory,
    ) -> Result<Option<Turn>, InteractionError> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        if question.len() > MAX_QUESTION_LEN {
            return Err(InteractionError::QuestionTooLong {
                len: question.len(),
                max: MAX_QUESTION_LEN,
            });
        }

        debug!(agent = self.agent.name(), len = question.len(), "handling question");

        let answer = match self.agent.answer(question, memory).await {
            Ok(answer) => answer,
            Err(source) => {
                if self.retention.logs_failures()
                    && let Err(e) = self.storage.append(question, "")
                {
                    warn!(error = %e, "failed to log unanswered question");
                }
                return Err(InteractionError::Provider {
                    question: question.to_string(),
                    source,
                });
            }
        };

        let logged = if self.retention.logs_answers() {
            self.storage.append(question, &answer)
        } else {
            Ok(Turn {
                id: 0,
                question: question.to_string(),
                answer: answer.clone(),
                timestamp: Utc::now().trunc_subsecs(0),
            })
        };

        memory.push_turn(question, &answer);

        match logged {
            Ok(turn) => Ok(Some(turn)),
            Err(source) => Err(InteractionError::Storage {
                question: question.to_string(),
                answer,
                source,
            }),
        }
    }
}

impl std::fmt::Debug for Interaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interaction")
            .field("agent", &self.agent.name())
            .field("retention", &self.retention)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ProviderError, StorageError};
    use crate::storage::{HistoryOrder, LogStats, SqliteStorage};

    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use test_case::test_case;

    /// Agent with canned answers keyed by question; unknown questions fail
    /// with a quota error.
    pub(crate) struct ScriptedAgent {
        answers: HashMap<String, String>,
        pub calls: AtomicUsize,
        pub seen_memory: Mutex<Vec<usize>>,
    }

    impl ScriptedAgent {
        pub(crate) fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                answers: pairs
                    .iter()
                    .map(|(q, a)| ((*q).to_string(), (*a).to_string()))
                    .collect(),
                calls: AtomicUsize::new(0),
                seen_memory: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnsweringAgent for ScriptedAgent {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn answer(
            &self,
            question: &str,
            memory: &ConversationMemory,
        ) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_memory.lock().unwrap().push(memory.turns());
            self.answers
                .get(question)
                .cloned()
                .ok_or_else(|| ProviderError::ApiRequest {
                    message: "quota exceeded".to_string(),
                    status: Some(429),
                })
        }
    }

    /// Log whose appends always fail.
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn init(&self) -> Result<(), StorageError> {
            Ok(())
        }
        fn is_initialized(&self) -> Result<bool, StorageError> {
            Ok(true)
        }
        fn append(&self, _: &str, _: &str) -> Result<Turn, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }
        fn list_recent(&self, _: usize) -> Result<Vec<Turn>, StorageError> {
            Ok(Vec::new())
        }
        fn list_all(&self, _: HistoryOrder) -> Result<Vec<Turn>, StorageError> {
            Ok(Vec::new())
        }
        fn get_turn(&self, _: i64) -> Result<Option<Turn>, StorageError> {
            Ok(None)
        }
        fn stats(&self) -> Result<LogStats, StorageError> {
            Ok(LogStats::default())
        }
    }

    pub(crate) fn memory_storage() -> Arc<SqliteStorage> {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.init().unwrap();
        Arc::new(storage)
    }

    fn setup(
        retention: RetentionPolicy,
    ) -> (Interaction, Arc<ScriptedAgent>, Arc<SqliteStorage>) {
        let agent = Arc::new(ScriptedAgent::new(&[(
            "What is the capital of France?",
            "Paris is the capital of France.",
        )]));
        let storage = memory_storage();
        let interaction = Interaction::new(agent.clone(), storage.clone(), retention);
        (interaction, agent, storage)
    }

    #[tokio::test]
    async fn test_answered_question_is_logged() {
        let (interaction, agent, storage) = setup(RetentionPolicy::Answered);
        let mut memory = ConversationMemory::new();

        let turn = interaction
            .handle_question("What is the capital of France?", &mut memory)
            .await
            .unwrap()
            .unwrap();

        assert!(turn.answer.contains("Paris"));
        let recent = storage.list_recent(1).unwrap();
        assert_eq!(recent, vec![turn]);
        assert_eq!(agent.calls(), 1);
        assert_eq!(memory.turns(), 1);
    }

    #[test_case("" ; "empty")]
    #[test_case("   " ; "spaces")]
    #[test_case("\t\n" ; "whitespace")]
    #[tokio::test]
    async fn test_blank_question_is_ignored(input: &str) {
        let (interaction, agent, storage) = setup(RetentionPolicy::All);
        let mut memory = ConversationMemory::new();

        let result = interaction.handle_question(input, &mut memory).await.unwrap();

        assert!(result.is_none());
        assert_eq!(agent.calls(), 0);
        assert_eq!(storage.stats().unwrap().turns, 0);
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_writes_nothing() {
        let (interaction, _agent, storage) = setup(RetentionPolicy::Answered);
        let mut memory = ConversationMemory::new();

        let err = interaction
            .handle_question("X", &mut memory)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InteractionError::Provider { ref question, .. } if question == "X"
        ));
        assert!(err.to_string().contains("\"X\""));
        assert_eq!(storage.stats().unwrap().turns, 0);
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_retention_all_logs_failures_with_empty_answer() {
        let (interaction, _agent, storage) = setup(RetentionPolicy::All);
        let mut memory = ConversationMemory::new();

        let _ = interaction.handle_question("X", &mut memory).await;

        let recent = storage.list_recent(1).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].question, "X");
        assert!(!recent[0].is_answered());
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_retention_off_logs_nothing() {
        let (interaction, _agent, storage) = setup(RetentionPolicy::Off);
        let mut memory = ConversationMemory::new();

        let turn = interaction
            .handle_question("What is the capital of France?", &mut memory)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(turn.id, 0);
        assert_eq!(storage.stats().unwrap().turns, 0);
        assert_eq!(memory.turns(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_still_returns_answer() {
        let agent = Arc::new(ScriptedAgent::new(&[("q", "a")]));
        let interaction = Interaction::new(
            agent,
            Arc::new(BrokenStorage),
            RetentionPolicy::Answered,
        );
        let mut memory = ConversationMemory::new();

        let err = interaction
            .handle_question("q", &mut memory)
            .await
            .unwrap_err();

        assert_eq!(err.answer(), Some("a"));
        assert_eq!(memory.turns(), 1);
    }

    #[tokio::test]
    async fn test_question_too_long() {
        let (interaction, agent, _storage) = setup(RetentionPolicy::Answered);
        let mut memory = ConversationMemory::new();
        let long = "x".repeat(MAX_QUESTION_LEN + 1);

        let err = interaction
            .handle_question(&long, &mut memory)
            .await
            .unwrap_err();

        assert!(matches!(err, InteractionError::QuestionTooLong { .. }));
        assert_eq!(agent.calls(), 0);
    }

    #[tokio::test]
    async fn test_memory_grows_across_questions() {
        let agent = Arc::new(ScriptedAgent::new(&[("one", "1"), ("two", "2")]));
        let storage = memory_storage();
        let interaction = Interaction::new(agent.clone(), storage, RetentionPolicy::Answered);
        let mut memory = ConversationMemory::new();

        interaction.handle_question("one", &mut memory).await.unwrap();
        interaction.handle_question("two", &mut memory).await.unwrap();

        assert_eq!(agent.seen_memory.lock().unwrap().as_slice(), [0, 1]);
    }

    #[tokio::test]
    async fn test_question_is_trimmed_before_logging() {
        let (interaction, _agent, storage) = setup(RetentionPolicy::Answered);
        let mut memory = ConversationMemory::new();

        interaction
            .handle_question("  What is the capital of France?\n", &mut memory)
            .await
            .unwrap();

        assert_eq!(
            storage.list_recent(1).unwrap()[0].question,
            "What is the capital of France?"
        );
    }
}
