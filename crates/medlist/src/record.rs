//! Doctor record model.
//!
//! A [`DoctorRecord`] is a fixed set of known fields plus an explicit map of
//! user-defined custom fields. A field is only ever present when it carries a
//! value: optional strings are trimmed and pruned when empty, and custom
//! pairs with an empty key or value are dropped.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Identifier of a doctor record. Unique across seed and overlay records.
pub type DoctorId = i64;

/// User-defined fields attached to a record outside its fixed schema.
pub type CustomFields = BTreeMap<String, String>;

/// Names of the fixed record fields. Custom field keys may not use these.
pub const FIXED_FIELDS: &[&str] = &[
    "id",
    "name",
    "specialty",
    "phone",
    "clinic",
    "schedule",
    "address",
    "experience",
];

static PHONE_REJECT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9+\s-]").expect("valid phone regex"));

/// A single entry in the directory.
///
/// Deserialization is lenient about what other clients may have stored:
/// `null` custom values are dropped, numeric or boolean custom values are
/// kept as text, and `experience` may be a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredRecord")]
pub struct DoctorRecord {
    /// Immutable identifier.
    pub id: DoctorId,
    /// Full name, including any honorific.
    pub name: String,
    /// Medical specialty.
    pub specialty: String,
    /// Contact phone number.
    pub phone: String,
    /// Clinic or hospital name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinic: Option<String>,
    /// Free-form opening hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// Street address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Years of experience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<u32>,
    /// Custom fields, flattened into the same JSON object.
    #[serde(flatten)]
    pub custom: CustomFields,
}

/// Wire shape of a [`DoctorRecord`] before loose values are coerced.
#[derive(Deserialize)]
struct StoredRecord {
    id: DoctorId,
    name: String,
    specialty: String,
    phone: String,
    #[serde(default)]
    clinic: Option<String>,
    #[serde(default)]
    schedule: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    experience: Option<Value>,
    #[serde(flatten)]
    custom: BTreeMap<String, Value>,
}

impl From<StoredRecord> for DoctorRecord {
    fn from(stored: StoredRecord) -> Self {
        Self {
            id: stored.id,
            name: stored.name,
            specialty: stored.specialty,
            phone: stored.phone,
            clinic: stored.clinic,
            schedule: stored.schedule,
            address: stored.address,
            experience: stored.experience.as_ref().and_then(years_from_value),
            custom: stored
                .custom
                .into_iter()
                .filter_map(|(key, value)| text_from_value(value).map(|text| (key, text)))
                .collect(),
        }
    }
}

fn years_from_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|years| u32::try_from(years).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Fixed-field payload of the registration and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    /// Required.
    pub name: String,
    /// Required.
    pub specialty: String,
    /// Required.
    pub phone: String,
    /// Optional clinic name.
    pub clinic: Option<String>,
    /// Optional schedule.
    pub schedule: Option<String>,
    /// Optional address.
    pub address: Option<String>,
    /// Optional years of experience.
    pub experience: Option<u32>,
}

impl RecordFields {
    /// Create a field set with only the required fields filled in.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        specialty: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            phone: phone.into(),
            ..Self::default()
        }
    }

    /// Check that every required field is non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first empty field, checked in
    /// the order name, specialty, phone.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("specialty", &self.specialty),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation(field));
            }
        }
        Ok(())
    }

    /// Build a pruned record from these fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if a required field is empty.
    pub fn into_record(self, id: DoctorId, custom: CustomFields) -> Result<DoctorRecord> {
        self.validate()?;
        Ok(DoctorRecord {
            id,
            name: self.name.trim().to_string(),
            specialty: self.specialty.trim().to_string(),
            phone: self.phone.trim().to_string(),
            clinic: prune(self.clinic),
            schedule: prune(self.schedule),
            address: prune(self.address),
            experience: self.experience,
            custom,
        })
    }
}

impl DoctorRecord {
    /// The fixed fields of this record, as an edit form would be prefilled.
    #[must_use]
    pub fn fields(&self) -> RecordFields {
        RecordFields {
            name: self.name.clone(),
            specialty: self.specialty.clone(),
            phone: self.phone.clone(),
            clinic: self.clinic.clone(),
            schedule: self.schedule.clone(),
            address: self.address.clone(),
            experience: self.experience,
        }
    }

    /// Re-apply the pruning rules to a record read from outside the program.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is empty or a custom
    /// key names a fixed field.
    pub fn normalized(self) -> Result<Self> {
        let id = self.id;
        let custom = normalize_custom(self.custom.clone())?;
        self.fields().into_record(id, custom)
    }

    /// Case-insensitive match of an already-lowercased needle against the
    /// name or specialty.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.specialty.to_lowercase().contains(needle)
    }
}

/// Trim an optional string, dropping it when nothing is left.
fn prune(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize user-supplied custom field pairs.
///
/// Keys and values are trimmed; pairs where either side ends up empty are
/// dropped. Later duplicates overwrite earlier ones.
///
/// # Errors
///
/// Returns [`Error::CustomFieldConflict`] if a key names a fixed field.
pub fn normalize_custom<I>(pairs: I) -> Result<CustomFields>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut custom = CustomFields::new();
    for (key, value) in pairs {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if FIXED_FIELDS.contains(&key) {
            return Err(Error::CustomFieldConflict {
                key: key.to_string(),
            });
        }
        custom.insert(key.to_string(), value.to_string());
    }
    Ok(custom)
}

/// Strip everything from a phone number except digits, `+`, whitespace and `-`.
#[must_use]
pub fn sanitize_phone(input: &str) -> String {
    PHONE_REJECT_RE.replace_all(input, "").into_owned()
}

/// Uppercase the first letter of every space-separated word and lowercase
/// the rest.
#[must_use]
pub fn capitalize_words(input: &str) -> String {
    input
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Parse a `key=value` custom field argument.
///
/// # Errors
///
/// Returns [`Error::MalformedInput`] if the input has no `=` separator.
pub fn parse_custom_field(input: &str) -> Result<(String, String)> {
    input
        .split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| Error::MalformedInput {
            input: input.to_string(),
            expected: "KEY=VALUE",
        })
}
