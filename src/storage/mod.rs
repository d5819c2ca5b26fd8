//! Persistent query log.
//!
//! The log is a single append-only SQLite table of [`Turn`]s. Callers can
//! append and read; nothing is ever updated or deleted.

pub mod schema;
pub mod sqlite;

pub use sqlite::SqliteStorage;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::Turn;
use crate::error::StorageError;

/// Default database location, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = ".research-assistant/qa.db";

/// Ordering for full history listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HistoryOrder {
    /// Most recent turn first.
    #[default]
    NewestFirst,
    /// Oldest turn first.
    OldestFirst,
}

/// Summary statistics for the query log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LogStats {
    /// Number of logged turns.
    pub turns: u64,
    /// Number of logged turns with an empty answer.
    pub unanswered: u64,
    /// Timestamp of the oldest turn.
    pub first_at: Option<DateTime<Utc>>,
    /// Timestamp of the newest turn.
    pub last_at: Option<DateTime<Utc>>,
    /// Schema version recorded in the database.
    pub schema_version: Option<i64>,
}

/// Append-only query log.
///
/// Implementations must make `append` durable before returning and must
/// assign ids atomically, so concurrent appends never share an id.
pub trait Storage: Send + Sync {
    /// Creates the schema if it does not exist. Idempotent.
    fn init(&self) -> Result<(), StorageError>;

    /// Returns `true` if the schema exists.
    fn is_initialized(&self) -> Result<bool, StorageError>;

    /// Appends a turn, assigning its id and timestamp.
    fn append(&self, question: &str, answer: &str) -> Result<Turn, StorageError>;

    /// Returns at most `limit` turns, most recent first.
    fn list_recent(&self, limit: usize) -> Result<Vec<Turn>, StorageError>;

    /// Returns every turn in the requested order.
    fn list_all(&self, order: HistoryOrder) -> Result<Vec<Turn>, StorageError>;

    /// Looks up a single turn.
    fn get_turn(&self, id: i64) -> Result<Option<Turn>, StorageError>;

    /// Returns summary statistics.
    fn stats(&self) -> Result<LogStats, StorageError>;
}
