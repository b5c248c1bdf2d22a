//! `medlist` - A searchable directory of medical professionals
//!
//! This library holds the doctor directory: a fixed set of built-in doctors,
//! an overlay of user-added and user-edited records persisted in `SQLite`,
//! case-insensitive search, an editor-mode PIN gate, and JSON backups.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod export;
pub mod gate;
pub mod logging;
pub mod record;
pub mod seed;
pub mod storage;
pub mod store;

pub use config::Config;
pub use directory::Directory;
pub use error::{Error, Result};
pub use export::ExportPayload;
pub use gate::{EditorGate, EditorMode};
pub use logging::init_logging;
pub use record::{CustomFields, DoctorId, DoctorRecord, RecordFields};
pub use seed::seed_doctors;
pub use storage::{OverlayStore, Storage};
pub use store::RecordStore;
