//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::error::{Error, Result};
use crate::record::{
    capitalize_words, parse_custom_field, sanitize_phone, CustomFields, DoctorId, RecordFields,
    FIXED_FIELDS,
};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to look for in names and specialties (case-insensitive)
    pub query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Registration form.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Full name, e.g. "Dra. Ana Rodríguez"
    #[arg(long)]
    pub name: String,

    /// Medical specialty
    #[arg(long)]
    pub specialty: String,

    /// Contact phone number
    #[arg(long)]
    pub phone: String,

    /// Clinic or hospital
    #[arg(long)]
    pub clinic: Option<String>,

    /// Opening hours, e.g. "Lun-Vie 8:00-17:00"
    #[arg(long)]
    pub schedule: Option<String>,

    /// Street address
    #[arg(long)]
    pub address: Option<String>,

    /// Years of experience
    #[arg(long)]
    pub experience: Option<u32>,
}

impl RegisterCommand {
    /// Convert the form into record fields, capitalizing the name and
    /// stripping stray characters from the phone number.
    #[must_use]
    pub fn into_fields(self) -> RecordFields {
        RecordFields {
            name: capitalize_words(&self.name),
            specialty: self.specialty,
            phone: sanitize_phone(&self.phone),
            clinic: self.clinic,
            schedule: self.schedule,
            address: self.address,
            experience: self.experience,
        }
    }
}

/// Edit command arguments.
///
/// Fields that are not given keep their current value. Passing an empty
/// string clears clinic, schedule or address; `--clear-experience` clears
/// the years of experience.
#[derive(Debug, Args)]
pub struct EditCommand {
    /// Id of the doctor to edit
    pub id: DoctorId,

    /// Editor PIN
    #[arg(long)]
    pub pin: String,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New specialty
    #[arg(long)]
    pub specialty: Option<String>,

    /// New phone number
    #[arg(long)]
    pub phone: Option<String>,

    /// New clinic
    #[arg(long)]
    pub clinic: Option<String>,

    /// New schedule
    #[arg(long)]
    pub schedule: Option<String>,

    /// New address
    #[arg(long)]
    pub address: Option<String>,

    /// New years of experience
    #[arg(long)]
    pub experience: Option<u32>,

    /// Remove the years of experience
    #[arg(long, conflicts_with = "experience")]
    pub clear_experience: bool,

    /// Set a custom field (repeatable)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// Remove a custom field (repeatable)
    #[arg(long = "remove-field", value_name = "KEY")]
    pub remove_fields: Vec<String>,
}

impl EditCommand {
    /// Overlay the given fixed fields onto `fields`.
    pub fn apply(&self, fields: &mut RecordFields) {
        if let Some(name) = &self.name {
            fields.name.clone_from(name);
        }
        if let Some(specialty) = &self.specialty {
            fields.specialty.clone_from(specialty);
        }
        if let Some(phone) = &self.phone {
            fields.phone.clone_from(phone);
        }
        if self.clinic.is_some() {
            fields.clinic.clone_from(&self.clinic);
        }
        if self.schedule.is_some() {
            fields.schedule.clone_from(&self.schedule);
        }
        if self.address.is_some() {
            fields.address.clone_from(&self.address);
        }
        if self.experience.is_some() {
            fields.experience = self.experience;
        }
        if self.clear_experience {
            fields.experience = None;
        }
    }

    /// Apply `--remove-field` and then `--field` to `custom`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] for a `--field` without `=`, or
    /// [`Error::CustomFieldConflict`] for a key naming a fixed field.
    pub fn apply_custom(&self, custom: &mut CustomFields) -> Result<()> {
        for key in &self.remove_fields {
            custom.remove(key.trim());
        }
        for raw in &self.fields {
            let (key, value) = parse_custom_field(raw)?;
            let key = key.trim();
            if FIXED_FIELDS.contains(&key) {
                return Err(Error::CustomFieldConflict {
                    key: key.to_string(),
                });
            }
            custom.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Id of the doctor to delete
    pub id: DoctorId,

    /// Editor PIN
    #[arg(long)]
    pub pin: String,
}

/// Export command arguments.
#[derive(Debug, Args)]
pub struct ExportCommand {
    /// Write the backup to this file or directory instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Reset command arguments.
#[derive(Debug, Args)]
pub struct ResetCommand {
    /// Editor PIN
    #[arg(long)]
    pub pin: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One card per doctor
    #[default]
    Plain,
    /// One row per doctor
    Table,
    /// JSON output
    Json,
}
