//! System prompt and message assembly for the research agent.
//!
//! The prompt can be replaced by a file (`RA_SYSTEM_PROMPT` or
//! `AgentConfig::system_prompt_path`); a missing or unreadable file falls
//! back to the compiled-in default.

use std::path::Path;

use tracing::warn;

use super::memory::ConversationMemory;
use super::message::{ChatMessage, system_message, user_message};

/// Default system prompt for the research agent.
pub const RESEARCH_SYSTEM_PROMPT: &str = r"You are a helpful research assistant.

Answer the user's question accurately and concisely. When the question depends on current events, recent data, or facts you are not sure about, call the `web_search` tool with a focused query and base your answer on its results. Cite the links you relied on.

Use the earlier conversation for context when the user refers back to it. If the search returns nothing useful, say so and answer from what you know, noting any uncertainty.";

/// Loads the system prompt, preferring `path` when it names a readable file.
#[must_use]
pub fn load_system_prompt(path: Option<&Path>) -> String {
    let Some(path) = path else {
        return RESEARCH_SYSTEM_PROMPT.to_string();
    };
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!(path = %path.display(), "system prompt file is empty, using default");
            RESEARCH_SYSTEM_PROMPT.to_string()
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read system prompt file, using default");
            RESEARCH_SYSTEM_PROMPT.to_string()
        }
    }
}

/// Builds the message list for one question: system prompt, remembered
/// exchanges (limited to `window` turns), then the new question.
#[must_use]
pub fn build_messages(
    system_prompt: &str,
    memory: &ConversationMemory,
    window: Option<usize>,
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(memory.len() + 2);
    messages.push(system_message(system_prompt));
    messages.extend(memory.to_messages(window));
    messages.push(user_message(question));
    messages
}
