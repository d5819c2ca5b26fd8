//! SQLite-backed query log.

use std::path::Path;
use std::time::Duration;

use chrono::{SubsecRound, Utc};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use super::schema::{CHECK_INITIALIZED_SQL, SCHEMA_SQL, SCHEMA_VERSION};
use super::{HistoryOrder, LogStats, Storage};
use crate::core::{TIMESTAMP_FORMAT, Turn};
use crate::error::StorageError;

/// How long a writer waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw row as read from `qa_log`, before timestamp decoding.
type RawTurn = (i64, String, String, String);

/// Query log stored in a single SQLite database.
///
/// The connection lives behind a mutex, so one instance can be shared
/// between sessions. Id assignment and the insert happen under the same
/// lock, which keeps ids unique and strictly increasing.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens (or creates) the database at `path`.
    ///
    /// Creates the parent directory when missing. Does not create the
    /// schema; call [`Storage::init`] for that.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!(path = %path.display(), "opened query log");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory database (used by tests).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens the database at `path` and creates the schema if needed.
    pub fn open_initialized(path: &Path) -> Result<Self, StorageError> {
        let storage = Self::open(path)?;
        storage.init()?;
        Ok(storage)
    }

    fn decode(raw: RawTurn) -> Result<Turn, StorageError> {
        let (id, question, answer, timestamp) = raw;
        let timestamp = Turn::parse_timestamp(&timestamp).ok_or(StorageError::InvalidTimestamp {
            id,
            value: timestamp,
        })?;
        Ok(Turn {
            id,
            question,
            answer,
            timestamp,
        })
    }

    fn query_turns(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Turn>, StorageError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<Result<Vec<RawTurn>, _>>()?;
        drop(stmt);
        drop(conn);

        rows.into_iter().map(Self::decode).collect()
    }
}

impl std::fmt::Debug for SqliteStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStorage")
            .field("conn", &"<rusqlite::Connection>")
            .finish()
    }
}

impl Storage for SqliteStorage {
    fn init(&self) -> Result<(), StorageError> {
        let conn = self.conn.lock();
        conn.execute_batch(SCHEMA_SQL)?;
        conn.execute(
            "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION.to_string()],
        )?;
        Ok(())
    }

    fn is_initialized(&self) -> Result<bool, StorageError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row(CHECK_INITIALIZED_SQL, [], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn append(&self, question: &str, answer: &str) -> Result<Turn, StorageError> {
        let timestamp = Utc::now().trunc_subsecs(0);
        let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO qa_log (question, answer, timestamp) VALUES (?1, ?2, ?3)",
            params![question, answer, stamp],
        )?;
        let id = conn.last_insert_rowid();
        drop(conn);

        debug!(id, answered = !answer.is_empty(), "appended turn");

        Ok(Turn {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
            timestamp,
        })
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<Turn>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.query_turns(
            "SELECT id, question, answer, timestamp FROM qa_log ORDER BY id DESC LIMIT ?1",
            params![limit],
        )
    }

    fn list_all(&self, order: HistoryOrder) -> Result<Vec<Turn>, StorageError> {
        let sql = match order {
            HistoryOrder::NewestFirst => {
                "SELECT id, question, answer, timestamp FROM qa_log ORDER BY id DESC"
            }
            HistoryOrder::OldestFirst => {
                "SELECT id, question, answer, timestamp FROM qa_log ORDER BY id ASC"
            }
        };
        self.query_turns(sql, [])
    }

    fn get_turn(&self, id: i64) -> Result<Option<Turn>, StorageError> {
        let conn = self.conn.lock();
        let raw: Option<RawTurn> = conn
            .query_row(
                "SELECT id, question, answer, timestamp FROM qa_log WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        drop(conn);

        raw.map(Self::decode).transpose()
    }

    fn stats(&self) -> Result<LogStats, StorageError> {
        let conn = self.conn.lock();
        let (turns, unanswered, first, last): (i64, i64, Option<String>, Option<String>) = conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(CASE WHEN answer = '' THEN 1 ELSE 0 END), 0),
                        MIN(timestamp),
                        MAX(timestamp)
                 FROM qa_log",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
        let schema_version: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        drop(conn);

        Ok(LogStats {
            turns: u64::try_from(turns).unwrap_or(0),
            unanswered: u64::try_from(unanswered).unwrap_or(0),
            first_at: first.as_deref().and_then(Turn::parse_timestamp),
            last_at: last.as_deref().and_then(Turn::parse_timestamp),
            schema_version: schema_version.and_then(|v| v.parse().ok()),
        })
    }
}
