//! Research agent: a chat model with a web-search tool.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::agentic_loop::{LoopPolicy, agentic_loop};
use super::config::AgentConfig;
use super::executor::ToolExecutor;
use super::memory::ConversationMemory;
use super::message::ChatRequest;
use super::prompt::{build_messages, load_system_prompt};
use super::provider::LlmProvider;
use super::tool::ToolSet;
use super::traits::AnsweringAgent;
use crate::error::ProviderError;
use crate::search::SearchTool;

/// Production [`AnsweringAgent`].
///
/// Each call builds a fresh request from the system prompt, the session's
/// memory and the question, then runs the bounded tool-calling loop with
/// `web_search` available.
pub struct ResearchAgent {
    provider: Arc<dyn LlmProvider>,
    search: Arc<dyn SearchTool>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    memory_window: Option<usize>,
    policy: LoopPolicy,
    system_prompt: String,
}

impl ResearchAgent {
    /// Creates an agent from configuration, loading the system prompt.
    #[must_use]
    pub fn new(
        config: &AgentConfig,
        provider: Arc<dyn LlmProvider>,
        search: Arc<dyn SearchTool>,
    ) -> Self {
        let system_prompt = load_system_prompt(config.system_prompt_path.as_deref());
        Self {
            provider,
            search,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            memory_window: config.memory_window,
            policy: LoopPolicy {
                max_iterations: config.max_tool_iterations,
                abort_on_tool_error: config.abort_on_tool_error,
            },
            system_prompt,
        }
    }

    /// Model used for completions.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for ResearchAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchAgent")
            .field("provider", &self.provider.name())
            .field("search", &self.search.name())
            .field("model", &self.model)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AnsweringAgent for ResearchAgent {
    fn name(&self) -> &'static str {
        "research"
    }

    async fn answer(
        &self,
        question: &str,
        memory: &ConversationMemory,
    ) -> Result<String, ProviderError> {
        let mut request = ChatRequest {
            model: self.model.clone(),
            messages: build_messages(&self.system_prompt, memory, self.memory_window, question),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
            tools: ToolSet::research_tools().into_definitions(),
        };
        debug!(
            model = self.model,
            history = memory.turns(),
            "answering question"
        );

        let executor = ToolExecutor::new(self.search.as_ref());
        let response =
            agentic_loop(self.provider.as_ref(), &mut request, &executor, self.policy).await?;

        let answer = response.content.trim();
        if answer.is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }

        info!(
            prompt_tokens = response.usage.prompt_tokens,
            completion_tokens = response.usage.completion_tokens,
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            "answer produced"
        );
        Ok(answer.to_string())
    }
}
