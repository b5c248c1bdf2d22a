//! Error types for medlist.
//!
//! This module defines all error types used throughout the medlist crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

use crate::record::DoctorId;

/// The main error type for medlist operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// A required field was missing or empty after trimming.
    #[error("required field '{field}' is empty")]
    Validation {
        /// Name of the offending field.
        field: String,
    },

    /// A custom field key collides with one of the fixed record fields.
    #[error("custom field '{key}' collides with a built-in field")]
    CustomFieldConflict {
        /// The rejected key.
        key: String,
    },

    /// Form input could not be parsed.
    #[error("malformed input '{input}': expected {expected}")]
    MalformedInput {
        /// The raw input.
        input: String,
        /// Description of the expected shape.
        expected: &'static str,
    },

    /// No record with the given id exists in the working set.
    #[error("no doctor with id {id}")]
    NotFound {
        /// The id that was looked up.
        id: DoctorId,
    },

    /// An editor-only operation was attempted while editor mode is locked.
    #[error("editor mode is locked")]
    EditorLocked,

    // === Persistence Errors ===
    /// The persisted overlay could not be decoded.
    #[error("failed to read persisted doctors: {message}")]
    PersistenceRead {
        /// Description of what went wrong.
        message: String,
    },

    /// The overlay could not be written back to storage.
    #[error("failed to persist doctors: {message}")]
    PersistenceWrite {
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for medlist operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a validation error for the named field.
    #[must_use]
    pub fn validation(field: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
        }
    }

    /// Create a persistence write error.
    #[must_use]
    pub fn persistence_write(message: impl Into<String>) -> Self {
        Self::PersistenceWrite {
            message: message.into(),
        }
    }

    /// Check if this error rejects user input (blocking notice, no state change).
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::CustomFieldConflict { .. }
                | Self::MalformedInput { .. }
        )
    }

    /// Check if this error refers to a missing record.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
