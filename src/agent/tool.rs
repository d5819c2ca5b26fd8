//! Tool type definitions for function-calling.
//!
//! Provides provider-agnostic types for tool definitions, calls, and results.
//! The only tool exposed to the model is `web_search`, backed by a
//! [`SearchTool`](crate::search::SearchTool).

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Name of the web-search tool as seen by the model.
pub const WEB_SEARCH: &str = "web_search";

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name (must match dispatch table in executor).
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (digest on success, error message on failure).
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// A set of tool definitions offered to the model.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    definitions: Vec<ToolDefinition>,
}

impl ToolSet {
    /// Returns the tool definitions in this set.
    #[must_use]
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Returns `true` if this set contains no tools.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Returns the number of tools in this set.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Tool set for the research agent: web search only.
    #[must_use]
    pub fn research_tools() -> Self {
        Self {
            definitions: vec![def_web_search()],
        }
    }

    /// Empty tool set (answer from the model alone).
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Consumes the set, returning its definitions.
    #[must_use]
    pub fn into_definitions(self) -> Vec<ToolDefinition> {
        self.definitions
    }
}

/// Defines the `web_search` tool.
fn def_web_search() -> ToolDefinition {
    ToolDefinition {
        name: WEB_SEARCH.to_string(),
        description: "Search the web for current information. Returns the top results \
                      as `title: link` lines, or \"No results found.\""
            .to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query text."
                }
            },
            "required": ["query"],
            "additionalProperties": false
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolset_research() {
        let ts = ToolSet::research_tools();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts.definitions()[0].name, WEB_SEARCH);
    }

    #[test]
    fn test_toolset_none() {
        let ts = ToolSet::none();
        assert!(ts.is_empty());
        assert!(ts.into_definitions().is_empty());
    }

    #[test]
    fn test_web_search_schema() {
        let def = def_web_search();
        assert_eq!(def.parameters["type"], "object");
        assert_eq!(def.parameters["required"][0], "query");
        let json = serde_json::to_string(&def).unwrap_or_default();
        assert!(json.contains("web_search"));
    }
}
