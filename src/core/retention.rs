//! Which interactions are written to the query log.

use serde::{Deserialize, Serialize};

/// Retention policy for the query log.
///
/// Blank questions are never logged, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Log a turn only when an answer was obtained.
    #[default]
    Answered,
    /// Also log failed questions, with an empty answer.
    All,
    /// Never write to the log.
    Off,
}

impl RetentionPolicy {
    /// Parses a policy name (case-insensitive).
    ///
    /// Returns `None` for unknown names.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "answered" => Some(Self::Answered),
            "all" | "always" => Some(Self::All),
            "off" | "none" | "never" => Some(Self::Off),
            _ => None,
        }
    }

    /// Returns `true` if successful answers are logged.
    #[must_use]
    pub const fn logs_answers(self) -> bool {
        matches!(self, Self::Answered | Self::All)
    }

    /// Returns `true` if failed questions are logged.
    #[must_use]
    pub const fn logs_failures(self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Answered => "answered",
            Self::All => "all",
            Self::Off => "off",
        }
    }
}

impl std::fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
