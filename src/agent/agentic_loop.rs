//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the iteration limit
//! is reached.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, assistant_tool_calls_message, tool_message};
use super::provider::LlmProvider;
use crate::error::ProviderError;

/// How the loop reacts to tool calls.
#[derive(Debug, Clone, Copy)]
pub struct LoopPolicy {
    /// Safety limit on model round-trips.
    pub max_iterations: usize,
    /// Abort the answer on the first failed tool call instead of handing
    /// the error back to the model.
    pub abort_on_tool_error: bool,
}

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds without tool calls (i.e., it produces
/// a final text answer) or `policy.max_iterations` is reached.
///
/// The returned [`ChatResponse`] carries the final answer and the usage
/// summed over every round-trip.
///
/// # Errors
///
/// Returns [`ProviderError::ToolLoopExceeded`] if the model keeps requesting
/// tools beyond the limit, [`ProviderError::Tool`] when a tool fails under
/// `abort_on_tool_error`, and propagates any provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor<'_>,
    policy: LoopPolicy,
) -> Result<ChatResponse, ProviderError> {
    let mut usage = super::message::TokenUsage::default();

    for iteration in 0..policy.max_iterations {
        let mut response = provider.chat(request).await?;
        usage.accumulate(response.usage);

        // If no tool calls, we have a final answer
        if response.tool_calls.is_empty() {
            debug!(iteration, "agentic loop completed with final text response");
            response.usage = usage;
            return Ok(response);
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        request
            .messages
            .push(assistant_tool_calls_message(response.tool_calls.clone()));

        for call in &response.tool_calls {
            let content = if policy.abort_on_tool_error {
                executor.try_execute(call).await?
            } else {
                let result = executor.execute(call).await;
                debug!(
                    tool = call.name,
                    call_id = call.id,
                    is_error = result.is_error,
                    "tool execution complete"
                );
                result.content
            };
            request.messages.push(tool_message(&call.id, &content));
        }
    }

    Err(ProviderError::ToolLoopExceeded {
        max_iterations: policy.max_iterations,
    })
}
