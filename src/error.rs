//! Error types for research-assistant.
//!
//! Each layer has its own `thiserror` enum; [`Error`] unifies them for the
//! CLI so commands can use `?` across layers.

use thiserror::Error;

/// Result alias used by the CLI layer.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or credential failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Model provider failure.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Search tool failure.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// Query log failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Interaction loop failure.
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

/// Configuration and credential errors.
///
/// These are fatal at startup: nothing downstream can run without them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential was not found in any source.
    #[error("missing required credential `{key}` (set it in the secrets file or via {env_var})")]
    MissingCredential {
        /// Dotted credential key, e.g. `search-provider.api_key`.
        key: String,
        /// Environment variable consulted as a fallback.
        env_var: String,
    },

    /// An explicitly requested secrets file does not exist.
    #[error("secrets file not found: {path}")]
    SecretsFileNotFound {
        /// Path that was requested.
        path: String,
    },

    /// The secrets file could not be read or parsed.
    #[error("invalid secrets file {path}: {message}")]
    InvalidSecretsFile {
        /// Path of the offending file.
        path: String,
        /// Parser or I/O message.
        message: String,
    },

    /// A setting had a value that could not be interpreted.
    #[error("invalid value for {name}: {value}")]
    InvalidValue {
        /// Setting name.
        name: String,
        /// Offending value.
        value: String,
    },
}

/// Model provider and agent errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Requested provider name is not supported.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name that was requested.
        name: String,
    },

    /// The chat completion request failed (auth, quota, network, timeout).
    #[error("API request failed: {message}")]
    ApiRequest {
        /// Error message from the client or provider.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// The provider returned a completion with no text.
    #[error("provider returned an empty completion")]
    EmptyCompletion,

    /// The model kept requesting tools past the iteration limit.
    #[error("tool-calling loop exceeded {max_iterations} iterations")]
    ToolLoopExceeded {
        /// The configured limit.
        max_iterations: usize,
    },

    /// A tool failure that aborted the answer.
    #[error("tool failure aborted the answer: {0}")]
    Tool(#[from] ToolError),
}

/// Search tool errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The query was blank.
    #[error("search query cannot be empty")]
    EmptyQuery,

    /// Transport-level failure (DNS, connect, timeout).
    #[error("search request failed: {message}")]
    Request {
        /// Underlying client message.
        message: String,
    },

    /// The search provider answered with a non-success status.
    #[error("search provider returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body (possibly truncated).
        body: String,
    },

    /// The search provider reported an error in its payload.
    #[error("search provider error: {message}")]
    Provider {
        /// Provider-reported message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("failed to parse search response: {message}")]
    Parse {
        /// Decoder message.
        message: String,
    },

    /// The model supplied malformed tool arguments.
    #[error("invalid arguments for tool {name}: {message}")]
    InvalidArguments {
        /// Tool name.
        name: String,
        /// Decoder message.
        message: String,
    },

    /// The model asked for a tool that does not exist.
    #[error("unknown tool: {name}")]
    UnknownTool {
        /// Requested tool name.
        name: String,
    },
}

/// Query log errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite failure (disk full, lock contention, corruption).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The schema has not been created.
    #[error("query log not initialized")]
    NotInitialized,

    /// A stored timestamp could not be decoded.
    #[error("invalid timestamp in row {id}: {value}")]
    InvalidTimestamp {
        /// Row id.
        id: i64,
        /// Raw stored value.
        value: String,
    },

    /// Filesystem failure preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI command errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command could not be carried out.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Output could not be rendered.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

/// Errors surfaced at the interaction loop boundary.
///
/// Every variant names the question that was not (fully) handled so the
/// surface can tell the user which input failed.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// The question exceeds the accepted length.
    #[error("question is too long ({len} bytes, max {max})")]
    QuestionTooLong {
        /// Length of the rejected question.
        len: usize,
        /// Maximum accepted length.
        max: usize,
    },

    /// The answering agent failed; nothing was logged.
    #[error("could not answer \"{question}\": {source}")]
    Provider {
        /// The unanswered question.
        question: String,
        /// Underlying failure.
        #[source]
        source: ProviderError,
    },

    /// The answer was produced but could not be written to the log.
    #[error("answered \"{question}\" but failed to record it: {source}")]
    Storage {
        /// The question.
        question: String,
        /// The answer that was produced.
        answer: String,
        /// Underlying failure.
        #[source]
        source: StorageError,
    },
}

impl InteractionError {
    /// Returns the answer text when one was produced despite the error.
    #[must_use]
    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Storage { answer, .. } => Some(answer),
            Self::QuestionTooLong { .. } | Self::Provider { .. } => None,
        }
    }
}
