//! Provider credentials.
//!
//! Credentials are read once at startup from a TOML secrets file, with
//! environment variables as a fallback, and are read-only afterwards.
//!
//! ```toml
//! [model-provider]      # or [openai]
//! api_key = "sk-..."    # or apikey
//!
//! [search-provider]     # or [serpapi]
//! api_key = "..."
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Default secrets file location, relative to the working directory.
pub const DEFAULT_SECRETS_PATH: &str = ".research-assistant/secrets.toml";

/// External providers that need a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProviderId {
    /// The chat-completion model provider.
    ModelProvider,
    /// The web-search provider.
    SearchProvider,
}

impl ProviderId {
    /// All providers, in load order.
    pub const ALL: [Self; 2] = [Self::ModelProvider, Self::SearchProvider];

    /// Provider id as used in the secrets file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ModelProvider => "model-provider",
            Self::SearchProvider => "search-provider",
        }
    }

    /// Dotted key naming this provider's API key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ModelProvider => "model-provider.api_key",
            Self::SearchProvider => "search-provider.api_key",
        }
    }

    /// Environment variable consulted when the file has no key.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::ModelProvider => "OPENAI_API_KEY",
            Self::SearchProvider => "SERPAPI_API_KEY",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where to look for credentials.
#[derive(Debug, Clone)]
pub struct CredentialSource {
    path: PathBuf,
    /// The file must exist (it was named explicitly).
    required: bool,
    /// Fall back to environment variables.
    use_env: bool,
}

impl CredentialSource {
    /// An explicitly named secrets file, which must exist.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            required: true,
            use_env: true,
        }
    }

    /// The default secrets file, used only if present.
    #[must_use]
    pub fn default_location() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SECRETS_PATH),
            required: false,
            use_env: true,
        }
    }

    /// Resolves the source from an optional CLI/env path.
    #[must_use]
    pub fn from_option(path: Option<&Path>) -> Self {
        path.map_or_else(Self::default_location, Self::file)
    }

    /// Enables or disables the environment fallback.
    #[must_use]
    pub const fn with_env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Path of the secrets file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Canonical and legacy spellings are separate fields so a file may carry
/// both; the canonical one wins when both are set.
#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "model-provider", default)]
    model_provider: Option<ProviderSection>,
    #[serde(default)]
    openai: Option<ProviderSection>,
    #[serde(rename = "search-provider", default)]
    search_provider: Option<ProviderSection>,
    #[serde(default)]
    serpapi: Option<ProviderSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderSection {
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    apikey: Option<String>,
}

impl ProviderSection {
    fn key(&self) -> Option<&str> {
        [self.api_key.as_deref(), self.apikey.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|k| !k.is_empty())
    }
}

impl SecretsFile {
    fn key(&self, provider: ProviderId) -> Option<&str> {
        let (canonical, legacy) = match provider {
            ProviderId::ModelProvider => (&self.model_provider, &self.openai),
            ProviderId::SearchProvider => (&self.search_provider, &self.serpapi),
        };
        [canonical.as_ref(), legacy.as_ref()]
            .into_iter()
            .flatten()
            .find_map(ProviderSection::key)
    }
}

/// Loaded provider credentials.
///
/// Both keys are guaranteed present and non-blank.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    model_api_key: String,
    search_api_key: String,
}

impl Credentials {
    /// Loads credentials from the given source.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::SecretsFileNotFound`] if an explicit file is missing.
    /// - [`ConfigError::InvalidSecretsFile`] if the file cannot be parsed.
    /// - [`ConfigError::MissingCredential`] if any key is absent from every source.
    pub fn load(source: &CredentialSource) -> Result<Self, ConfigError> {
        Self::load_with(source, |name| std::env::var(name).ok())
    }

    /// Loads credentials using `env` to resolve environment variables.
    pub fn load_with<F>(source: &CredentialSource, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = Self::read_file(source)?;

        let resolve = |provider: ProviderId| -> Result<String, ConfigError> {
            let from_file = file
                .key(provider)
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string);
            let value = from_file.or_else(|| {
                if source.use_env {
                    env(provider.env_var())
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                } else {
                    None
                }
            });
            value.ok_or_else(|| ConfigError::MissingCredential {
                key: provider.key().to_string(),
                env_var: provider.env_var().to_string(),
            })
        };

        Ok(Self {
            model_api_key: resolve(ProviderId::ModelProvider)?,
            search_api_key: resolve(ProviderId::SearchProvider)?,
        })
    }

    /// Builds credentials directly (tests and embedding).
    #[must_use]
    pub fn new(model_api_key: impl Into<String>, search_api_key: impl Into<String>) -> Self {
        Self {
            model_api_key: model_api_key.into(),
            search_api_key: search_api_key.into(),
        }
    }

    fn read_file(source: &CredentialSource) -> Result<SecretsFile, ConfigError> {
        let path = source.path();
        if !path.exists() {
            if source.required {
                return Err(ConfigError::SecretsFileNotFound {
                    path: path.display().to_string(),
                });
            }
            debug!(path = %path.display(), "no secrets file, using environment");
            return Ok(SecretsFile::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::InvalidSecretsFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::InvalidSecretsFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the key for `provider`.
    #[must_use]
    pub fn get(&self, provider: ProviderId) -> &str {
        match provider {
            ProviderId::ModelProvider => &self.model_api_key,
            ProviderId::SearchProvider => &self.search_api_key,
        }
    }

    /// Iterates over `(provider, key)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ProviderId, &str)> {
        ProviderId::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("model_api_key", &"<redacted>")
            .field("search_api_key", &"<redacted>")
            .finish()
    }
}
