//! Answering agent capability trait.
//!
//! The interaction loop only needs "question + memory in, answer out";
//! everything about models, tools and prompts stays behind this trait.

use async_trait::async_trait;

use super::memory::ConversationMemory;
use crate::error::ProviderError;

/// Something that can answer a question given the session's memory.
///
/// Implementations must not mutate memory; the caller records the exchange
/// once it knows the outcome.
#[async_trait]
pub trait AnsweringAgent: Send + Sync {
    /// Agent name for logging and identification.
    fn name(&self) -> &'static str;

    /// Produces an answer for `question`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when no non-empty answer could be produced.
    async fn answer(
        &self,
        question: &str,
        memory: &ConversationMemory,
    ) -> Result<String, ProviderError>;
}
