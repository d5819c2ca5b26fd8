//! Output rendering for CLI commands.
//!
//! Commands return a `String`; this module renders domain values as plain
//! text or JSON.

use std::fmt::Write;

use serde::Serialize;

use crate::core::{RetentionPolicy, Turn};
use crate::storage::LogStats;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; unknown names fall back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    /// Serializes a value as pretty JSON followed by a newline.
    #[must_use]
    pub fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> String {
        let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            serde_json::json!({ "error": format!("serialization failed: {e}") }).to_string()
        });
        out.push('\n');
        out
    }
}

/// Renders the result of `ask`: the answer, then optional recent history.
#[must_use]
pub fn format_answer(turn: &Turn, history: &[Turn], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = format!("{}\n", turn.answer);
            if !history.is_empty() {
                out.push_str("\n--- Recent history ---\n");
                out.push_str(&format_turns(history, format));
            }
            out
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct AnswerJson<'a> {
                id: i64,
                question: &'a str,
                answer: &'a str,
                timestamp: String,
                #[serde(skip_serializing_if = "<[Turn]>::is_empty")]
                history: &'a [Turn],
            }
            format.to_json(&AnswerJson {
                id: turn.id,
                question: &turn.question,
                answer: &turn.answer,
                timestamp: turn.timestamp_string(),
                history,
            })
        }
    }
}

/// Renders a list of turns.
#[must_use]
pub fn format_turns(turns: &[Turn], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            if turns.is_empty() {
                return "No questions logged yet.\n".to_string();
            }
            let mut out = String::new();
            for turn in turns {
                let _ = writeln!(out, "{turn}\n");
            }
            out
        }
        OutputFormat::Json => format.to_json(turns),
    }
}

/// Renders log statistics for `status`.
#[must_use]
pub fn format_status(
    stats: &LogStats,
    db_path: &std::path::Path,
    retention: RetentionPolicy,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Text => {
            let stamp = |ts: Option<chrono::DateTime<chrono::Utc>>| {
                ts.map_or_else(
                    || "-".to_string(),
                    |t| t.format(crate::core::TIMESTAMP_FORMAT).to_string(),
                )
            };
            let mut out = String::new();
            let _ = writeln!(out, "Query log: {}", db_path.display());
            let _ = writeln!(
                out,
                "Schema version: {}",
                stats
                    .schema_version
                    .map_or_else(|| "-".to_string(), |v| v.to_string())
            );
            let _ = writeln!(out, "Retention: {retention}");
            let _ = writeln!(out, "Turns: {}", stats.turns);
            if stats.unanswered > 0 {
                let _ = writeln!(out, "Unanswered: {}", stats.unanswered);
            }
            let _ = writeln!(out, "First: {}", stamp(stats.first_at));
            let _ = writeln!(out, "Last: {}", stamp(stats.last_at));
            out
        }
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct StatusJson<'a> {
                db_path: String,
                retention: RetentionPolicy,
                #[serde(flatten)]
                stats: &'a LogStats,
            }
            format.to_json(&StatusJson {
                db_path: db_path.display().to_string(),
                retention,
                stats,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn turn(id: i64, q: &str, a: &str) -> Turn {
        Turn {
            id,
            question: q.to_string(),
            answer: a.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(OutputFormat::parse("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::parse("yaml"), OutputFormat::Text);
    }

    #[test]
    fn test_format_answer_text_with_history() {
        let t = turn(2, "What is the capital of France?", "Paris.");
        let history = vec![t.clone(), turn(1, "Who wrote Dune?", "Frank Herbert.")];
        let out = format_answer(&t, &history, OutputFormat::Text);
        assert!(out.starts_with("Paris.\n"));
        assert!(out.contains("--- Recent history ---"));
        assert!(out.contains("Q: Who wrote Dune?"));
    }

    #[test]
    fn test_format_answer_json() {
        let t = turn(2, "q", "a");
        let out = format_answer(&t, &[], OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["answer"], "a");
        assert_eq!(value["timestamp"], "2024-01-02 03:04:05");
        assert!(value.get("history").is_none());
    }

    #[test]
    fn test_format_turns_empty() {
        assert_eq!(
            format_turns(&[], OutputFormat::Text),
            "No questions logged yet.\n"
        );
        assert_eq!(format_turns(&[], OutputFormat::Json).trim(), "[]");
    }

    #[test]
    fn test_format_turns_unanswered() {
        let out = format_turns(&[turn(1, "X", "")], OutputFormat::Text);
        assert!(out.contains("A: (no answer)"));
    }

    #[test]
    fn test_format_status_json() {
        let stats = LogStats {
            turns: 3,
            schema_version: Some(1),
            ..LogStats::default()
        };
        let out = format_status(
            &stats,
            std::path::Path::new("qa.db"),
            RetentionPolicy::Answered,
            OutputFormat::Json,
        );
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["turns"], 3);
        assert_eq!(value["retention"], "answered");
        assert_eq!(value["db_path"], "qa.db");
    }
}
