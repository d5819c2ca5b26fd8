//! SQLite schema for the query log.

/// Current schema version, stored in the `meta` table.
pub const SCHEMA_VERSION: i64 = 1;

/// Schema creation script. Every statement is idempotent.
pub const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS qa_log (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    question  TEXT NOT NULL,
    answer    TEXT NOT NULL,
    timestamp TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now'))
);

CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Query used to detect an initialized database.
pub const CHECK_INITIALIZED_SQL: &str =
    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'qa_log'";
