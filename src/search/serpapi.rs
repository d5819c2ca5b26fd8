//! SerpAPI search adapter.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::config::SearchConfig;
use super::{NO_RESULTS, SearchTool};
use crate::error::ToolError;

/// Maximum bytes of an error body carried into [`ToolError::Status`].
const MAX_ERROR_BODY: usize = 500;

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// Google search through SerpAPI.
pub struct SerpApiSearch {
    client: Client,
    config: SearchConfig,
}

impl SerpApiSearch {
    /// Creates a new adapter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Request`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, ToolError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ToolError::Request {
                message: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn search_url(&self, query: &str) -> Result<Url, ToolError> {
        let num = self.config.num_results.to_string();
        Url::parse_with_params(
            &format!("{}/search.json", self.config.base_url),
            &[
                ("engine", self.config.engine.as_str()),
                ("q", query),
                ("api_key", self.config.api_key.as_str()),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| ToolError::Request {
            message: format!("invalid search URL: {e}"),
        })
    }

    /// Renders the top `limit` results as `title: link` lines.
    fn digest(results: &[OrganicResult], limit: usize) -> String {
        let lines: Vec<String> = results
            .iter()
            .filter_map(|r| {
                let link = r.link.as_deref()?;
                let title = r.title.as_deref().unwrap_or(link);
                Some(format!("{title}: {link}"))
            })
            .take(limit)
            .collect();

        if lines.is_empty() {
            NO_RESULTS.to_string()
        } else {
            lines.join("\n")
        }
    }
}

impl std::fmt::Debug for SerpApiSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerpApiSearch")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchTool for SerpApiSearch {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, query: &str) -> Result<String, ToolError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ToolError::EmptyQuery);
        }

        let url = self.search_url(query)?;
        debug!(query, "searching");

        // Strip the URL from transport errors: it carries the API key.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ToolError::Request {
                message: e.without_url().to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(ToolError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: SerpApiResponse = response.json().await.map_err(|e| ToolError::Parse {
            message: e.without_url().to_string(),
        })?;

        if let Some(message) = payload.error {
            // SerpAPI reports an empty result set through the error field too.
            if message.contains("hasn't returned any results") {
                return Ok(NO_RESULTS.to_string());
            }
            return Err(ToolError::Provider { message });
        }

        debug!(results = payload.organic_results.len(), "search complete");
        Ok(Self::digest(
            &payload.organic_results,
            self.config.num_results,
        ))
    }
}
