//! Web-search tool adapter.
//!
//! Wraps a third-party search API behind a single text-in/text-out call
//! that the answering agent exposes to the model as a tool.

pub mod config;
pub mod serpapi;

pub use config::SearchConfig;
pub use serpapi::SerpApiSearch;

use async_trait::async_trait;

use crate::error::ToolError;

/// Digest returned when the provider has no results for a query.
pub const NO_RESULTS: &str = "No results found.";

/// A web-search capability.
#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &'static str;

    /// Runs `query` and returns a human-readable digest of the top results,
    /// or [`NO_RESULTS`] when there are none.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] on blank queries, network or quota failures,
    /// and malformed provider responses.
    async fn search(&self, query: &str) -> Result<String, ToolError>;
}
