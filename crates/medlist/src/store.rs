//! The record store.
//!
//! [`RecordStore`] owns the working set: the seed records followed by the
//! persisted overlay, deduplicated by id with the seed winning. Commands
//! either apply completely or leave the store untouched.

use std::collections::HashSet;

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::record::{normalize_custom, CustomFields, DoctorId, DoctorRecord, RecordFields};

/// In-memory working set of doctor records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    seed: Vec<DoctorRecord>,
    records: Vec<DoctorRecord>,
}

impl RecordStore {
    /// Build the working set from the seed and a persisted overlay.
    ///
    /// Overlay records whose id is already taken (by a seed record or an
    /// earlier overlay record) are dropped, as are records that fail
    /// validation. Surviving overlay records are normalized.
    #[must_use]
    pub fn load(seed: Vec<DoctorRecord>, overlay: Vec<DoctorRecord>) -> Self {
        let mut records = seed.clone();
        let mut ids: HashSet<DoctorId> = records.iter().map(|r| r.id).collect();

        for record in overlay {
            if ids.contains(&record.id) {
                warn!(id = record.id, "Dropping persisted doctor with an id already in use");
                continue;
            }
            match record.normalized() {
                Ok(record) => {
                    ids.insert(record.id);
                    records.push(record);
                }
                Err(e) => warn!("Dropping invalid persisted doctor: {}", e),
            }
        }

        debug!(
            "Loaded {} doctors ({} built-in)",
            records.len(),
            seed.len()
        );
        Self { seed, records }
    }

    /// The built-in seed records.
    #[must_use]
    pub fn seed(&self) -> &[DoctorRecord] {
        &self.seed
    }

    /// The working set, in display order.
    #[must_use]
    pub fn records(&self) -> &[DoctorRecord] {
        &self.records
    }

    /// Number of records in the working set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the working set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by id.
    #[must_use]
    pub fn get(&self, id: DoctorId) -> Option<&DoctorRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Whether `id` belongs to a built-in record.
    #[must_use]
    pub fn is_seed(&self, id: DoctorId) -> bool {
        self.seed.iter().any(|r| r.id == id)
    }

    fn position(&self, id: DoctorId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::NotFound { id })
    }

    /// Records whose name or specialty contains `query`, ignoring case.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&DoctorRecord> {
        search(&self.records, query)
    }

    /// Allocate an id not used by the working set or the seed.
    ///
    /// Starts from the current Unix time in milliseconds and steps forward
    /// until a free id is found.
    #[must_use]
    pub fn next_id(&self) -> DoctorId {
        let mut id = Utc::now().timestamp_millis();
        while self.get(id).is_some() || self.is_seed(id) {
            id += 1;
        }
        id
    }

    /// Register a new doctor and append it to the working set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if name, specialty or phone is empty.
    pub fn create(&mut self, fields: RecordFields) -> Result<&DoctorRecord> {
        let record = fields.into_record(self.next_id(), CustomFields::new())?;
        debug!(id = record.id, "Registering doctor {}", record.name);

        let index = self.records.len();
        self.records.push(record);
        Ok(&self.records[index])
    }

    /// Replace the record with the given id.
    ///
    /// The fixed fields are taken wholesale from `fields`; the record's
    /// custom fields become exactly `custom` after normalization.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id,
    /// [`Error::Validation`] if a required field is empty, or
    /// [`Error::CustomFieldConflict`] if a custom key names a fixed field.
    pub fn update<I>(&mut self, id: DoctorId, fields: RecordFields, custom: I) -> Result<&DoctorRecord>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let index = self.position(id)?;
        fields.validate()?;
        let custom = normalize_custom(custom)?;
        let record = fields.into_record(id, custom)?;

        debug!(id, "Updating doctor {}", record.name);
        self.records[index] = record;
        Ok(&self.records[index])
    }

    /// Remove the record with the given id and return it.
    ///
    /// Removing a built-in record only affects the working set; it comes
    /// back on the next [`RecordStore::load`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no record has this id.
    pub fn delete(&mut self, id: DoctorId) -> Result<DoctorRecord> {
        let index = self.position(id)?;
        if self.is_seed(id) {
            warn!(id, "Deleting a built-in doctor; it will reappear on reload");
        }
        Ok(self.records.remove(index))
    }

    /// The records that should be persisted.
    #[must_use]
    pub fn derive_overlay(&self) -> Vec<DoctorRecord> {
        derive_overlay(&self.records, &self.seed)
    }
}

/// Filter `records` by a case-insensitive substring match on name or
/// specialty.
///
/// The query is trimmed; an empty query matches everything. Order is
/// preserved.
#[must_use]
pub fn search<'a>(records: &'a [DoctorRecord], query: &str) -> Vec<&'a DoctorRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| r.matches(&needle)).collect()
}

/// The subsequence of `records` whose id is not a seed id.
#[must_use]
pub fn derive_overlay(records: &[DoctorRecord], seed: &[DoctorRecord]) -> Vec<DoctorRecord> {
    let seed_ids: HashSet<DoctorId> = seed.iter().map(|r| r.id).collect();
    records
        .iter()
        .filter(|r| !seed_ids.contains(&r.id))
        .cloned()
        .collect()
}
