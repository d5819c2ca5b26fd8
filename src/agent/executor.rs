//! Tool executor that dispatches model tool calls to the search adapter.

use serde::Deserialize;
use tracing::warn;

use super::tool::{ToolCall, ToolResult, WEB_SEARCH};
use crate::error::ToolError;
use crate::search::SearchTool;

/// Maximum raw byte length of tool argument JSON from the LLM.
const MAX_TOOL_ARGS_LEN: usize = 10_000;
/// Maximum search query length in bytes.
const MAX_QUERY_LEN: usize = 1_000;

/// Executes tool calls against a [`SearchTool`].
pub struct ToolExecutor<'a> {
    search: &'a dyn SearchTool,
}

impl<'a> ToolExecutor<'a> {
    /// Creates a new executor backed by the given search tool.
    #[must_use]
    pub fn new(search: &'a dyn SearchTool) -> Self {
        Self { search }
    }

    /// Dispatches a tool call, returning the raw outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] for oversized or malformed arguments, unknown
    /// tools, and search failures.
    pub async fn try_execute(&self, call: &ToolCall) -> Result<String, ToolError> {
        if call.arguments.len() > MAX_TOOL_ARGS_LEN {
            return Err(ToolError::InvalidArguments {
                name: call.name.clone(),
                message: format!(
                    "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
                    call.arguments.len()
                ),
            });
        }

        match call.name.as_str() {
            WEB_SEARCH => self.tool_web_search(&call.arguments).await,
            other => Err(ToolError::UnknownTool {
                name: other.to_string(),
            }),
        }
    }

    /// Dispatches a tool call, folding failures into an error result the
    /// model can read.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.try_execute(call).await {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => {
                warn!(tool = call.name, error = %e, "tool call failed");
                ToolResult {
                    tool_call_id: call.id.clone(),
                    content: format!("Error: {e}"),
                    is_error: true,
                }
            }
        }
    }

    async fn tool_web_search(&self, args: &str) -> Result<String, ToolError> {
        #[derive(Deserialize)]
        struct Args {
            query: String,
        }
        let args: Args = serde_json::from_str(args).map_err(|e| ToolError::InvalidArguments {
            name: WEB_SEARCH.to_string(),
            message: e.to_string(),
        })?;

        if args.query.len() > MAX_QUERY_LEN {
            return Err(ToolError::InvalidArguments {
                name: WEB_SEARCH.to_string(),
                message: format!(
                    "query too long ({} bytes, max {MAX_QUERY_LEN})",
                    args.query.len()
                ),
            });
        }

        self.search.search(&args.query).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// Search stub that records queries and returns a fixed outcome.
    pub(crate) struct StubSearch {
        pub queries: Mutex<Vec<String>>,
        pub fail: bool,
    }

    impl StubSearch {
        pub(crate) fn ok() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                queries: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl SearchTool for StubSearch {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn search(&self, query: &str) -> Result<String, ToolError> {
            self.queries.lock().unwrap().push(query.to_string());
            if self.fail {
                Err(ToolError::Status {
                    status: 429,
                    body: "quota".to_string(),
                })
            } else {
                Ok(format!("Result for {query}: https://example.com"))
            }
        }
    }

    fn call(name: &str, arguments: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    #[tokio::test]
    async fn test_execute_web_search() {
        let search = StubSearch::ok();
        let executor = ToolExecutor::new(&search);
        let result = executor
            .execute(&call(WEB_SEARCH, r#"{"query":"capital of France"}"#))
            .await;
        assert!(!result.is_error);
        assert_eq!(result.tool_call_id, "call_1");
        assert!(result.content.contains("capital of France"));
        assert_eq!(search.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_execute_unknown_tool() {
        let search = StubSearch::ok();
        let executor = ToolExecutor::new(&search);
        let result = executor.execute(&call("delete_everything", "{}")).await;
        assert!(result.is_error);
        assert!(result.content.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_execute_invalid_arguments() {
        let search = StubSearch::ok();
        let executor = ToolExecutor::new(&search);
        let err = executor
            .try_execute(&call(WEB_SEARCH, r#"{"q": 1}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(search.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_oversized_arguments() {
        let search = StubSearch::ok();
        let executor = ToolExecutor::new(&search);
        let big = format!(r#"{{"query":"{}"}}"#, "x".repeat(MAX_TOOL_ARGS_LEN));
        let result = executor.execute(&call(WEB_SEARCH, &big)).await;
        assert!(result.is_error);
        assert!(result.content.contains("too large"));
    }

    #[tokio::test]
    async fn test_execute_search_failure_becomes_error_result() {
        let search = StubSearch::failing();
        let executor = ToolExecutor::new(&search);
        let result = executor
            .execute(&call(WEB_SEARCH, r#"{"query":"x"}"#))
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("429"));
    }
}
