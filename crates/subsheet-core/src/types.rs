//! Core types for subsheet-core.
//!
//! This module defines the two record shapes that bracket the normalizer:
//! the untrusted [`CandidateRecord`] produced by an extraction step, and the
//! trusted [`ValidatedRecord`] handed on to storage. [`Field`] names every
//! column both shapes share.

use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Field
// ---------------------------------------------------------------------------

/// A named column of a subculture record.
///
/// The wire names (see [`Field::as_str`]) are exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    PlantName,
    SubcultureDate,
    DoneBy,
    JarsUsed,
    ContaminatedJars,
    JarsToHardening,
    Notes,
}

impl Field {
    /// Every field, in wire order.
    pub const ALL: [Field; 7] = [
        Field::PlantName,
        Field::SubcultureDate,
        Field::DoneBy,
        Field::JarsUsed,
        Field::ContaminatedJars,
        Field::JarsToHardening,
        Field::Notes,
    ];

    /// Fields a row cannot be accepted without.
    pub const REQUIRED: [Field; 3] = [Field::PlantName, Field::SubcultureDate, Field::JarsUsed];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::PlantName => "plantName",
            Field::SubcultureDate => "subcultureDate",
            Field::DoneBy => "doneBy",
            Field::JarsUsed => "jarsUsed",
            Field::ContaminatedJars => "contaminatedJars",
            Field::JarsToHardening => "jarsToHardening",
            Field::Notes => "notes",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CandidateRecord
// ---------------------------------------------------------------------------

/// One loosely-typed row as produced by the extraction step.
///
/// Every field is optional raw text. Absence is the only "no value" state the
/// normalizer recognises: [`CandidateRecord::get`] folds empty and
/// whitespace-only text into `None`, so `Some("")` and `None` behave alike.
///
/// Deserialization is lenient because the producer is untrusted: JSON numbers
/// and booleans are re-expressed as text, `null` and empty strings become
/// absent, nested arrays/objects are dropped, and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub plant_name: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub subculture_date: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub done_by: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub jars_used: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub contaminated_jars: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub jars_to_hardening: Option<String>,
    #[serde(default, deserialize_with = "loose_text", skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CandidateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. Empty text is stored as absent.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field. Empty or whitespace-only text clears it.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        *self.slot_mut(field) = if value.trim().is_empty() { None } else { Some(value) };
    }

    /// The trimmed text of `field`, or `None` when it is absent or blank.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.slot(field)
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Fields that carry a non-blank value.
    pub fn present_fields(&self) -> impl Iterator<Item = Field> + '_ {
        Field::ALL.into_iter().filter(|f| self.get(*f).is_some())
    }

    fn slot(&self, field: Field) -> &Option<String> {
        match field {
            Field::PlantName => &self.plant_name,
            Field::SubcultureDate => &self.subculture_date,
            Field::DoneBy => &self.done_by,
            Field::JarsUsed => &self.jars_used,
            Field::ContaminatedJars => &self.contaminated_jars,
            Field::JarsToHardening => &self.jars_to_hardening,
            Field::Notes => &self.notes,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::PlantName => &mut self.plant_name,
            Field::SubcultureDate => &mut self.subculture_date,
            Field::DoneBy => &mut self.done_by,
            Field::JarsUsed => &mut self.jars_used,
            Field::ContaminatedJars => &mut self.contaminated_jars,
            Field::JarsToHardening => &mut self.jars_to_hardening,
            Field::Notes => &mut self.notes,
        }
    }
}

/// Accept any JSON scalar as text; treat null, blanks and containers as absent.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// ValidatedRecord
// ---------------------------------------------------------------------------

/// A subculture event that passed the full validation pipeline.
///
/// Fields are crate-private: the only constructor is
/// [`schema::validate`](crate::schema::validate), so a value of this type is
/// always well-formed. It serializes with the same camelCase names as
/// [`CandidateRecord`], omitting absent optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedRecord {
    pub(crate) plant_name: String,
    pub(crate) subculture_date: String,
    #[serde(skip)]
    pub(crate) date: chrono::NaiveDate,
    pub(crate) done_by: String,
    pub(crate) jars_used: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) contaminated_jars: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) jars_to_hardening: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) notes: Option<String>,
}

impl ValidatedRecord {
    pub fn plant_name(&self) -> &str {
        &self.plant_name
    }

    /// Canonical `YYYY-MM-DD` date.
    pub fn subculture_date(&self) -> &str {
        &self.subculture_date
    }

    /// The same date as a calendar value.
    pub fn date(&self) -> chrono::NaiveDate {
        self.date
    }

    pub fn done_by(&self) -> &str {
        &self.done_by
    }

    pub fn jars_used(&self) -> u32 {
        self.jars_used
    }

    pub fn contaminated_jars(&self) -> Option<u32> {
        self.contaminated_jars
    }

    pub fn jars_to_hardening(&self) -> Option<u32> {
        self.jars_to_hardening
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Re-express this record as raw candidate text.
    ///
    /// Normalizing the result yields an equal record.
    pub fn to_candidate(&self) -> CandidateRecord {
        CandidateRecord {
            plant_name: Some(self.plant_name.clone()),
            subculture_date: Some(self.subculture_date.clone()),
            done_by: Some(self.done_by.clone()),
            jars_used: Some(self.jars_used.to_string()),
            contaminated_jars: self.contaminated_jars.map(|n| n.to_string()),
            jars_to_hardening: self.jars_to_hardening.map(|n| n.to_string()),
            notes: self.notes.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
