//! Database schema versioning for medlist.
//!
//! The version lives in the `metadata` table. Each pending step from
//! [`MIGRATIONS`] runs in its own transaction together with the version bump,
//! so an interrupted upgrade resumes from the last completed step.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{Error, Result};

use super::schema::{CREATE_METADATA_TABLE, MIGRATIONS};

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// The schema version this build writes.
#[must_use]
pub fn current_version() -> usize {
    MIGRATIONS.len()
}

/// Bring the database schema up to [`current_version`].
///
/// # Errors
///
/// Returns an error if a migration step fails, or if the database was
/// written by a newer version of medlist.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_METADATA_TABLE, [])?;

    let found = schema_version(conn)?;
    let target = current_version();
    if found > target {
        return Err(Error::DatabaseMigration {
            message: format!(
                "database schema version {found} is newer than supported version {target}"
            ),
        });
    }

    for (version, statements) in MIGRATIONS.iter().enumerate().skip(found) {
        apply_step(conn, version + 1, statements)?;
    }
    if found < target {
        info!("Database schema upgraded from v{} to v{}", found, target);
    }
    Ok(())
}

/// Stored schema version, or 0 for a fresh database.
fn schema_version(conn: &Connection) -> Result<usize> {
    let stored: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match stored {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn apply_step(conn: &Connection, version: usize, statements: &[&str]) -> Result<()> {
    debug!("Applying schema migration v{}", version);
    let tx = conn.unchecked_transaction()?;
    for statement in statements {
        tx.execute(statement, []).map_err(|e| Error::DatabaseMigration {
            message: format!("migration v{version} failed: {e}"),
        })?;
    }
    store_version(&tx, version)?;
    tx.commit()?;
    Ok(())
}

fn store_version(conn: &Connection, version: usize) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_fresh_database_is_migrated() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        assert!(table_exists(&conn, "slots"));
        assert!(table_exists(&conn, "metadata"));
        assert_eq!(schema_version(&conn).unwrap(), current_version());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO slots (name, payload, updated_at) VALUES ('doctors', '[]', 'now')",
            [],
        )
        .unwrap();

        initialize_schema(&conn).unwrap();
        let count: i32 = conn
            .query_row("SELECT COUNT(*) FROM slots", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_version_reads_as_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), 0);
    }

    #[test]
    fn test_newer_schema_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        store_version(&conn, current_version() + 1).unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(matches!(err, Error::DatabaseMigration { .. }));
        assert!(err.to_string().contains("newer than supported"));
    }

    #[test]
    fn test_garbage_version_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute(
            "UPDATE metadata SET value = 'abc' WHERE key = ?1",
            [VERSION_KEY],
        )
        .unwrap();

        let err = schema_version(&conn).unwrap_err();
        assert!(err.to_string().contains("invalid schema version"));
    }

    #[test]
    fn test_failed_step_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(CREATE_METADATA_TABLE, []).unwrap();

        let err = apply_step(&conn, 1, &[CREATE_METADATA_TABLE, "NOT SQL"]).unwrap_err();
        assert!(err.to_string().contains("migration v1 failed"));
        assert_eq!(schema_version(&conn).unwrap(), 0);
    }
}
