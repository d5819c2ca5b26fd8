//! Per-session conversation memory.
//!
//! Memory is an ordered, append-only transcript of user/assistant exchanges.
//! It belongs to a single session and is handed to the agent by reference
//! so earlier turns can inform later answers.

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, assistant_message, user_message};

/// Speaker of a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRole {
    /// The person asking.
    User,
    /// The agent answering.
    Assistant,
}

/// One remembered message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    /// Who said it.
    pub role: MemoryRole,
    /// What was said.
    pub content: String,
}

/// Ordered transcript for one session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    entries: Vec<MemoryEntry>,
}

impl ConversationMemory {
    /// Creates an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed exchange.
    pub fn push_turn(&mut self, question: &str, answer: &str) {
        self.entries.push(MemoryEntry {
            role: MemoryRole::User,
            content: question.to_string(),
        });
        self.entries.push(MemoryEntry {
            role: MemoryRole::Assistant,
            content: answer.to_string(),
        });
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[MemoryEntry] {
        &self.entries
    }

    /// Number of entries (two per exchange).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of completed exchanges.
    #[must_use]
    pub fn turns(&self) -> usize {
        self.entries.len() / 2
    }

    /// Converts memory into chat messages.
    ///
    /// With `window = Some(n)` only the last `n` exchanges are returned;
    /// `None` returns the full transcript.
    #[must_use]
    pub fn to_messages(&self, window: Option<usize>) -> Vec<ChatMessage> {
        let skip = window.map_or(0, |n| self.entries.len().saturating_sub(n.saturating_mul(2)));
        self.entries
            .iter()
            .skip(skip)
            .map(|e| match e.role {
                MemoryRole::User => user_message(&e.content),
                MemoryRole::Assistant => assistant_message(&e.content),
            })
            .collect()
    }
}
