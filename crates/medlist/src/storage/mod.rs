//! Storage layer for medlist.
//!
//! This module provides `SQLite`-based persistence for the user-added part
//! of the directory. The database is a key/value store of named slots; the
//! overlay lives in one slot as a JSON array of doctor records.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::DoctorRecord;

/// Default slot holding the persisted overlay.
pub const DEFAULT_SLOT: &str = "doctors";

/// Where the overlay is read from and written to.
///
/// The record store never touches the storage medium itself; it only
/// computes what should be persisted and hands it to an implementor of this
/// trait.
pub trait OverlayStore {
    /// Read the persisted overlay.
    ///
    /// Never fails: a missing or corrupt payload is treated as an empty
    /// overlay.
    fn read(&self) -> Vec<DoctorRecord>;

    /// Replace the persisted overlay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceWrite`] if the overlay was not stored.
    fn write(&self, records: &[DoctorRecord]) -> Result<()>;

    /// Remove the persisted overlay entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PersistenceWrite`] if the overlay could not be removed.
    fn clear(&self) -> Result<()>;
}

/// `SQLite`-backed slot storage.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Slot holding the overlay.
    slot: String,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>, slot: impl Into<String>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self {
            path,
            conn,
            slot: slot.into(),
        })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory(slot: impl Into<String>) -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            slot: slot.into(),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the slot holding the overlay.
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Read the raw payload stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn read_slot(&self, name: &str) -> Result<Option<String>> {
        let payload = self
            .conn
            .query_row(
                "SELECT payload FROM slots WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(payload)
    }

    /// Store `payload` under `name`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn write_slot(&self, name: &str, payload: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO slots (name, payload, updated_at) VALUES (?1, ?2, ?3)",
            params![name, payload, Utc::now().to_rfc3339()],
        )?;
        debug!("Wrote {} bytes to slot {}", payload.len(), name);
        Ok(())
    }

    /// Remove the slot `name`. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_slot(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM slots WHERE name = ?1", [name])?;
        Ok(affected > 0)
    }
}

impl OverlayStore for Storage {
    fn read(&self) -> Vec<DoctorRecord> {
        let payload = match self.read_slot(&self.slot) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable slot {}: {}", self.slot, e);
                return Vec::new();
            }
        };

        decode_overlay(&payload).unwrap_or_else(|e| {
            warn!("{}; starting with an empty overlay", e);
            Vec::new()
        })
    }

    fn write(&self, records: &[DoctorRecord]) -> Result<()> {
        let payload = serde_json::to_string(records)
            .map_err(|e| Error::persistence_write(e.to_string()))?;
        self.write_slot(&self.slot, &payload)
            .map_err(|e| Error::persistence_write(e.to_string()))?;
        info!("Persisted {} doctors", records.len());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self
            .remove_slot(&self.slot)
            .map_err(|e| Error::persistence_write(e.to_string()))?
        {
            info!("Cleared persisted doctors");
        }
        Ok(())
    }
}

/// Decode an overlay payload.
///
/// A `null` payload is an empty overlay. Array elements that are not valid
/// doctor records are skipped.
///
/// # Errors
///
/// Returns [`Error::PersistenceRead`] if the payload is not JSON or not an
/// array.
pub fn decode_overlay(payload: &str) -> Result<Vec<DoctorRecord>> {
    let value: Value = serde_json::from_str(payload).map_err(|e| Error::PersistenceRead {
        message: e.to_string(),
    })?;

    let items = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => {
            return Err(Error::PersistenceRead {
                message: format!("expected an array, found {}", json_kind(&other)),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<DoctorRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed persisted doctor #{}: {}", index, e),
        }
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CustomFields, RecordFields};

    fn create_test_storage() -> Storage {
        Storage::open_in_memory(DEFAULT_SLOT).expect("failed to create test storage")
    }

    fn create_test_record(id: i64, name: &str) -> DoctorRecord {
        let mut custom = CustomFields::new();
        custom.insert("email".to_string(), format!("{id}@example.com"));
        let mut fields = RecordFields::new(name, "Neurología", "+591 700");
        fields.experience = Some(3);
        fields.into_record(id, custom).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
        assert_eq!(storage.slot(), "doctors");
    }

    #[test]
    fn test_read_missing_slot_is_empty() {
        let storage = create_test_storage();
        assert!(storage.read().is_empty());
    }

    #[test]
    fn test_write_and_read() {
        let storage = create_test_storage();
        let records = vec![create_test_record(10, "Dr. A"), create_test_record(11, "Dr. B")];

        storage.write(&records).unwrap();
        assert_eq!(storage.read(), records);
    }

    #[test]
    fn test_write_replaces_previous_overlay() {
        let storage = create_test_storage();
        storage.write(&[create_test_record(10, "Dr. A")]).unwrap();
        storage.write(&[create_test_record(11, "Dr. B")]).unwrap();

        let read = storage.read();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].id, 11);
    }

    #[test]
    fn test_payload_layout() {
        let storage = create_test_storage();
        storage.write(&[create_test_record(10, "Dr. A")]).unwrap();

        let raw = storage.read_slot("doctors").unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let first = &value.as_array().unwrap()[0];
        assert_eq!(first["id"], 10);
        assert_eq!(first["experience"], 3);
        assert_eq!(first["email"], "10@example.com");
        assert!(first.get("clinic").is_none());
    }

    #[test]
    fn test_corrupt_payload_reads_as_empty() {
        let storage = create_test_storage();
        storage.write_slot("doctors", "{not json").unwrap();
        assert!(storage.read().is_empty());
    }

    #[test]
    fn test_non_array_payload_reads_as_empty() {
        let storage = create_test_storage();
        storage.write_slot("doctors", r#"{"id": 1}"#).unwrap();
        assert!(storage.read().is_empty());
    }

    #[test]
    fn test_null_payload_reads_as_empty() {
        assert!(decode_overlay("null").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_elements_are_skipped() {
        let payload = r#"[
            {"id": 10, "name": "Dr. A", "specialty": "Neuro", "phone": "1"},
            {"id": "eleven", "name": "Dr. B"},
            {"id": 12, "name": "Dr. C", "specialty": "Neuro", "phone": null}
        ]"#;
        let records = decode_overlay(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 10);
    }

    #[test]
    fn test_loose_values_keep_the_record() {
        let payload = r#"[
            {"id": 10, "name": "Dr. A", "specialty": "Neuro", "phone": "1",
             "clinic": null, "email": null},
            {"id": 11, "name": "Dr. B", "specialty": "Neuro", "phone": "1", "experience": "15"},
            {"id": 12, "name": "Dr. C", "specialty": "Neuro", "phone": "1", "experience": -2}
        ]"#;
        let records = decode_overlay(payload).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records[0].custom.is_empty());
        assert_eq!(records[1].experience, Some(15));
        assert!(records[2].experience.is_none());
    }

    #[test]
    fn test_null_custom_value_survives_rewrite() {
        let storage = create_test_storage();
        storage
            .write_slot(
                "doctors",
                r#"[{"id":10,"name":"Dr. A","specialty":"Neuro","phone":"1","clinic":null,"email":null}]"#,
            )
            .unwrap();

        let mut records = storage.read();
        records.push(create_test_record(11, "Dr. B"));
        storage.write(&records).unwrap();

        let ids: Vec<i64> = storage.read().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn test_decode_reports_kind() {
        let err = decode_overlay("42").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }

    #[test]
    fn test_clear() {
        let storage = create_test_storage();
        storage.write(&[create_test_record(10, "Dr. A")]).unwrap();
        storage.clear().unwrap();
        assert!(storage.read().is_empty());
        assert!(storage.read_slot("doctors").unwrap().is_none());

        // Clearing twice is fine.
        storage.clear().unwrap();
    }

    #[test]
    fn test_slots_are_independent() {
        let storage = create_test_storage();
        storage.write_slot("other", "[]").unwrap();
        storage.write(&[create_test_record(10, "Dr. A")]).unwrap();

        assert_eq!(storage.read_slot("other").unwrap().as_deref(), Some("[]"));
        assert!(storage.remove_slot("other").unwrap());
        assert!(!storage.remove_slot("other").unwrap());
        assert_eq!(storage.read().len(), 1);
    }

    #[test]
    fn test_write_failure_is_reported() {
        let storage = create_test_storage();
        storage.conn.execute("DROP TABLE slots", []).unwrap();

        let err = storage.write(&[create_test_record(10, "Dr. A")]).unwrap_err();
        assert!(matches!(err, Error::PersistenceWrite { .. }));
        assert!(storage.read().is_empty());
    }

    #[test]
    fn test_open_file_based() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("medlist.db");

        {
            let storage = Storage::open(&db_path, DEFAULT_SLOT).unwrap();
            assert_eq!(storage.path(), db_path);
            storage.write(&[create_test_record(10, "Dr. A")]).unwrap();
        }

        let reopened = Storage::open(&db_path, DEFAULT_SLOT).unwrap();
        assert_eq!(reopened.read(), vec![create_test_record(10, "Dr. A")]);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested_path = dir.path().join("nested/deeper/medlist.db");

        let _storage = Storage::open(&nested_path, DEFAULT_SLOT).unwrap();
        assert!(nested_path.exists());
    }
}
