//! A single logged question/answer exchange.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage format for turn timestamps (matches SQLite's `datetime('now')`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One question/answer pair recorded in the query log.
///
/// Turns are created once, when an answer is produced, and never change
/// afterwards. The `id` is assigned by the log on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Log-assigned identifier (strictly increasing).
    pub id: i64,
    /// The question as submitted.
    pub question: String,
    /// The agent's answer. Empty only for failed questions logged under
    /// [`RetentionPolicy::All`](super::RetentionPolicy::All).
    pub answer: String,
    /// Write time, second precision, UTC.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Returns `true` if this turn records a successful answer.
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        !self.answer.is_empty()
    }

    /// Formats the timestamp the way it is stored.
    #[must_use]
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Parses a stored timestamp.
    ///
    /// Returns `None` when the value is not in [`TIMESTAMP_FORMAT`].
    #[must_use]
    pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
            .ok()
            .map(|naive| naive.and_utc())
    }
}

/// Renders `[timestamp] Q: ...` / `A: ...`, the layout used by every
/// text surface.
impl std::fmt::Display for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}] Q: {}", self.timestamp_string(), self.question)?;
        if self.is_answered() {
            write!(f, "A: {}", self.answer)
        } else {
            f.write_str("A: (no answer)")
        }
    }
}
