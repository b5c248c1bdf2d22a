//! `SQLite` schema definitions for medlist.
//!
//! Storage is a small key/value table of named slots, each holding one JSON
//! document. Everything except the metadata table is created by a numbered
//! migration step.

/// SQL statement to create the metadata table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// SQL statement to create the slots table.
pub const CREATE_SLOTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS slots (
    name TEXT PRIMARY KEY,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// Migration steps. Entry `n` upgrades a database from version `n` to `n + 1`.
pub const MIGRATIONS: &[&[&str]] = &[
    // v1: named JSON slots
    &[CREATE_SLOTS_TABLE],
];
