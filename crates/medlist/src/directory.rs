//! Write-through directory.
//!
//! [`Directory`] pairs a [`RecordStore`] with an [`OverlayStore`]. Every
//! successful command is followed by a write of the derived overlay; when
//! that write fails the command is undone and the error is returned, so the
//! in-memory working set never runs ahead of what is persisted.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::error::Result;
use crate::export::ExportPayload;
use crate::record::{DoctorId, DoctorRecord, RecordFields};
use crate::seed::seed_doctors;
use crate::storage::OverlayStore;
use crate::store::RecordStore;

/// The doctor directory backed by persistent storage.
#[derive(Debug)]
pub struct Directory<S: OverlayStore> {
    store: RecordStore,
    storage: S,
}

impl<S: OverlayStore> Directory<S> {
    /// Load the built-in doctors plus whatever `storage` holds.
    pub fn open(storage: S) -> Self {
        Self::with_seed(seed_doctors(), storage)
    }

    /// Load a custom seed set plus whatever `storage` holds.
    pub fn with_seed(seed: Vec<DoctorRecord>, storage: S) -> Self {
        let overlay = storage.read();
        Self {
            store: RecordStore::load(seed, overlay),
            storage,
        }
    }

    /// The underlying record store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// The persistence adapter.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The working set, in display order.
    #[must_use]
    pub fn records(&self) -> &[DoctorRecord] {
        self.store.records()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: DoctorId) -> Option<&DoctorRecord> {
        self.store.get(id)
    }

    /// Records whose name or specialty contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&DoctorRecord> {
        self.store.search(query)
    }

    /// Register a new doctor and persist it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing required fields, or
    /// [`crate::Error::PersistenceWrite`] if the overlay could not be saved.
    pub fn register(&mut self, fields: RecordFields) -> Result<DoctorRecord> {
        self.commit(|store| store.create(fields).cloned())
    }

    /// Replace a record and persist the change.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`], a validation error, or
    /// [`crate::Error::PersistenceWrite`].
    pub fn update<I>(&mut self, id: DoctorId, fields: RecordFields, custom: I) -> Result<DoctorRecord>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.commit(|store| store.update(id, fields, custom).cloned())
    }

    /// Remove a record and persist the change.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] or [`crate::Error::PersistenceWrite`].
    pub fn delete(&mut self, id: DoctorId) -> Result<DoctorRecord> {
        self.commit(|store| store.delete(id))
    }

    /// Snapshot the working set for backup.
    #[must_use]
    pub fn export(&self, now: DateTime<Utc>) -> ExportPayload {
        ExportPayload::from_store(&self.store, now)
    }

    /// Drop every persisted record and reload from the seed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::PersistenceWrite`] if storage could not be cleared.
    pub fn reset(&mut self) -> Result<()> {
        self.storage.clear()?;
        let seed = self.store.seed().to_vec();
        self.store = RecordStore::load(seed, Vec::new());
        info!("Directory reset to {} built-in doctors", self.store.len());
        Ok(())
    }

    fn commit<T, F>(&mut self, command: F) -> Result<T>
    where
        F: FnOnce(&mut RecordStore) -> Result<T>,
    {
        let snapshot = self.store.clone();
        let outcome = command(&mut self.store)?;

        if let Err(e) = self.storage.write(&self.store.derive_overlay()) {
            error!("Rolling back change that could not be saved: {}", e);
            self.store = snapshot;
            return Err(e);
        }
        Ok(outcome)
    }
}
