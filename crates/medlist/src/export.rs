//! Backup export payload.
//!
//! Builds the JSON document handed to the user as a backup of the whole
//! working set. Writing it anywhere is left to the caller.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::record::DoctorRecord;
use crate::store::RecordStore;

/// Format version stamped into every export.
pub const EXPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A full snapshot of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    /// The working set, in display order.
    pub doctors: Vec<DoctorRecord>,
    /// When the export was taken (RFC 3339).
    pub export_date: String,
    /// Exporting program version.
    pub version: String,
    /// Number of records in `doctors`.
    pub total_doctors: usize,
    /// Records that belong to the built-in seed set.
    pub static_doctors: usize,
    /// Records added by users.
    pub dynamic_doctors: usize,
    /// Custom field name to the number of records using it.
    pub custom_fields: BTreeMap<String, usize>,
}

impl ExportPayload {
    /// Snapshot `store` as of `now`.
    #[must_use]
    pub fn from_store(store: &RecordStore, now: DateTime<Utc>) -> Self {
        let doctors = store.records().to_vec();
        let static_doctors = doctors.iter().filter(|d| store.is_seed(d.id)).count();

        let mut custom_fields = BTreeMap::new();
        for key in doctors.iter().flat_map(|d| d.custom.keys()) {
            *custom_fields.entry(key.clone()).or_insert(0) += 1;
        }

        Self {
            total_doctors: doctors.len(),
            dynamic_doctors: doctors.len() - static_doctors,
            static_doctors,
            doctors,
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
            custom_fields,
        }
    }

    /// Suggested file name, e.g. `doctors_backup_2024-05-01.json`.
    #[must_use]
    pub fn backup_file_name(&self) -> String {
        let date = self.export_date.split('T').next().unwrap_or_default();
        format!("doctors_backup_{date}.json")
    }
}
