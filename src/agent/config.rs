//! Agent configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Default chat-completion model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Default sampling temperature.
const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default max tokens per completion.
const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default maximum tool-calling loop iterations.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;

/// Configuration for the answering agent.
#[derive(Clone)]
pub struct AgentConfig {
    /// LLM provider name (e.g., "openai").
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Optional base URL override (for proxies or compatible APIs).
    pub base_url: Option<String>,
    /// Chat-completion model.
    pub model: String,
    /// Sampling temperature (0.0–2.0).
    pub temperature: f32,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum tool-calling loop iterations before aborting.
    pub max_tool_iterations: usize,
    /// Number of most recent memory turns sent with each question.
    /// `None` sends the whole session transcript.
    pub memory_window: Option<usize>,
    /// Abort an answer on the first failed search instead of letting the
    /// model continue without it.
    pub abort_on_tool_error: bool,
    /// File holding a replacement system prompt.
    pub system_prompt_path: Option<PathBuf>,
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("memory_window", &self.memory_window)
            .field("abort_on_tool_error", &self.abort_on_tool_error)
            .field("system_prompt_path", &self.system_prompt_path)
            .finish()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
    max_tool_iterations: Option<usize>,
    memory_window: Option<usize>,
    abort_on_tool_error: Option<bool>,
    system_prompt_path: Option<PathBuf>,
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = std::env::var("RA_PROVIDER").ok();
        }
        if self.api_key.is_none() {
            self.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.base_url.is_none() {
            self.base_url = std::env::var("OPENAI_BASE_URL").ok();
        }
        if self.model.is_none() {
            self.model = std::env::var("RA_MODEL").ok();
        }
        if self.temperature.is_none() {
            self.temperature = std::env::var("RA_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.max_tool_iterations.is_none() {
            self.max_tool_iterations = std::env::var("RA_MAX_TOOL_ITERATIONS")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.memory_window.is_none() {
            self.memory_window = std::env::var("RA_MEMORY_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok());
        }
        if self.abort_on_tool_error.is_none() {
            self.abort_on_tool_error = std::env::var("RA_ABORT_ON_TOOL_ERROR")
                .ok()
                .and_then(|v| parse_flag(&v));
        }
        if self.system_prompt_path.is_none() {
            self.system_prompt_path = std::env::var("RA_SYSTEM_PROMPT").ok().map(PathBuf::from);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL override.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, t: f32) -> Self {
        self.temperature = Some(t);
        self
    }

    /// Sets the max tokens per completion.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Sets the maximum tool-calling loop iterations.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the memory window (turns sent per question).
    #[must_use]
    pub const fn memory_window(mut self, turns: usize) -> Self {
        self.memory_window = Some(turns);
        self
    }

    /// Sets whether a failed search aborts the answer.
    #[must_use]
    pub const fn abort_on_tool_error(mut self, abort: bool) -> Self {
        self.abort_on_tool_error = Some(abort);
        self
    }

    /// Sets the system prompt override file.
    #[must_use]
    pub fn system_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_prompt_path = Some(path.into());
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if no API key was set and
    /// [`ConfigError::InvalidValue`] for out-of-range settings.
    pub fn build(self) -> Result<AgentConfig, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                key: "model-provider.api_key".to_string(),
                env_var: "OPENAI_API_KEY".to_string(),
            })?;

        let temperature = self.temperature.unwrap_or(DEFAULT_TEMPERATURE);
        if !(0.0..=2.0).contains(&temperature) {
            return Err(ConfigError::InvalidValue {
                name: "temperature".to_string(),
                value: temperature.to_string(),
            });
        }

        let max_tool_iterations = self
            .max_tool_iterations
            .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS);
        if max_tool_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_tool_iterations".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(AgentConfig {
            provider: self.provider.unwrap_or_else(|| "openai".to_string()),
            api_key,
            base_url: self.base_url,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature,
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
            max_tool_iterations,
            memory_window: self.memory_window,
            abort_on_tool_error: self.abort_on_tool_error.unwrap_or(false),
            system_prompt_path: self.system_prompt_path,
        })
    }
}

/// Parses a boolean environment value; unrecognised input yields `None`.
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1", Some(true) ; "one")]
    #[test_case("TRUE", Some(true) ; "uppercase true")]
    #[test_case(" yes ", Some(true) ; "padded yes")]
    #[test_case("off", Some(false) ; "off")]
    #[test_case("0", Some(false) ; "zero")]
    #[test_case("maybe", None ; "unrecognised")]
    fn test_parse_flag(value: &str, expected: Option<bool>) {
        assert_eq!(parse_flag(value), expected);
    }

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert!((config.temperature - DEFAULT_TEMPERATURE).abs() < f32::EPSILON);
        assert_eq!(config.max_tool_iterations, DEFAULT_MAX_TOOL_ITERATIONS);
        assert!(config.memory_window.is_none());
        assert!(!config.abort_on_tool_error);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().build();
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredential { ref key, .. }) if key == "model-provider.api_key"
        ));
    }

    #[test]
    fn test_builder_rejects_bad_temperature() {
        let result = AgentConfig::builder().api_key("k").temperature(3.5).build();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_builder_rejects_zero_iterations() {
        let result = AgentConfig::builder()
            .api_key("k")
            .max_tool_iterations(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("custom")
            .model("gpt-4o")
            .temperature(0.5)
            .memory_window(4)
            .abort_on_tool_error(true)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "custom");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.memory_window, Some(4));
        assert!(config.abort_on_tool_error);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AgentConfig::builder()
            .api_key("sk-very-secret")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(!format!("{config:?}").contains("sk-very-secret"));
    }
}
