//! Schema: The declarative shape of a [`ValidatedRecord`].
//!
//! [`SUBCULTURE_SCHEMA`] lists one [`FieldRule`] per column. [`validate`]
//! checks a fully assembled [`RecordDraft`] against every rule and is the only
//! way to obtain a [`ValidatedRecord`]. The coercion steps in the normalizer
//! run first and reject most bad rows early; this check is the final word on
//! shape.

use chrono::NaiveDate;

use crate::types::{Field, ValidatedRecord};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Text that is non-empty after trimming and carries no surrounding
    /// whitespace.
    NonEmptyText,
    /// A zero-padded `YYYY-MM-DD` calendar date.
    IsoDate,
    /// An integer in `min..=u32::MAX`.
    CountAtLeast(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: Field,
    pub presence: Presence,
    pub constraint: Constraint,
}

const fn rule(field: Field, presence: Presence, constraint: Constraint) -> FieldRule {
    FieldRule { field, presence, constraint }
}

pub const SUBCULTURE_SCHEMA: &[FieldRule] = &[
    rule(Field::PlantName, Presence::Required, Constraint::NonEmptyText),
    rule(Field::SubcultureDate, Presence::Required, Constraint::IsoDate),
    rule(Field::DoneBy, Presence::Required, Constraint::NonEmptyText),
    rule(Field::JarsUsed, Presence::Required, Constraint::CountAtLeast(1)),
    rule(Field::ContaminatedJars, Presence::Optional, Constraint::CountAtLeast(0)),
    rule(Field::JarsToHardening, Presence::Optional, Constraint::CountAtLeast(0)),
    rule(Field::Notes, Presence::Optional, Constraint::NonEmptyText),
];

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// A record assembled by coercion but not yet checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDraft {
    pub plant_name: Option<String>,
    pub subculture_date: Option<String>,
    pub done_by: Option<String>,
    pub jars_used: Option<i64>,
    pub contaminated_jars: Option<i64>,
    pub jars_to_hardening: Option<i64>,
    pub notes: Option<String>,
}

/// A draft field as seen by the rule checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftValue<'a> {
    Absent,
    Text(&'a str),
    Count(i64),
}

impl RecordDraft {
    pub fn value(&self, field: Field) -> DraftValue<'_> {
        fn text(v: &Option<String>) -> DraftValue<'_> {
            v.as_deref().map_or(DraftValue::Absent, DraftValue::Text)
        }
        fn count<'a>(v: Option<i64>) -> DraftValue<'a> {
            v.map_or(DraftValue::Absent, DraftValue::Count)
        }
        match field {
            Field::PlantName => text(&self.plant_name),
            Field::SubcultureDate => text(&self.subculture_date),
            Field::DoneBy => text(&self.done_by),
            Field::JarsUsed => count(self.jars_used),
            Field::ContaminatedJars => count(self.contaminated_jars),
            Field::JarsToHardening => count(self.jars_to_hardening),
            Field::Notes => text(&self.notes),
        }
    }
}

// ---------------------------------------------------------------------------
// Violations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("`{0}` is required")]
    Missing(Field),

    #[error("`{0}` must be non-empty text without surrounding whitespace")]
    BadText(Field),

    #[error("`{field}` must be a YYYY-MM-DD date, got {value:?}")]
    NotIsoDate { field: Field, value: String },

    #[error("`{field}` must be between {min} and {max}, got {value}")]
    OutOfRange { field: Field, value: i64, min: i64, max: i64 },

    #[error("`{0}` has the wrong type")]
    WrongType(Field),
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check `draft` against [`SUBCULTURE_SCHEMA`].
///
/// Returns every violation found, in schema order, so a rejected row can be
/// explained in full.
pub fn check(draft: &RecordDraft) -> Result<(), Vec<SchemaViolation>> {
    let violations: Vec<SchemaViolation> = SUBCULTURE_SCHEMA
        .iter()
        .filter_map(|rule| check_rule(rule, draft.value(rule.field)).err())
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Check `draft` and, if it conforms, build the [`ValidatedRecord`].
pub fn validate(draft: RecordDraft) -> Result<ValidatedRecord, Vec<SchemaViolation>> {
    check(&draft)?;

    let required_text = |value: Option<String>, field: Field| {
        value.ok_or_else(|| vec![SchemaViolation::Missing(field)])
    };
    let count = |value: Option<i64>, field: Field| -> Result<Option<u32>, Vec<SchemaViolation>> {
        value
            .map(|v| u32::try_from(v).map_err(|_| vec![SchemaViolation::WrongType(field)]))
            .transpose()
    };

    let subculture_date = required_text(draft.subculture_date, Field::SubcultureDate)?;
    let date = NaiveDate::parse_from_str(&subculture_date, "%Y-%m-%d").map_err(|_| {
        vec![SchemaViolation::NotIsoDate {
            field: Field::SubcultureDate,
            value: subculture_date.clone(),
        }]
    })?;

    Ok(ValidatedRecord {
        plant_name: required_text(draft.plant_name, Field::PlantName)?,
        subculture_date,
        date,
        done_by: required_text(draft.done_by, Field::DoneBy)?,
        jars_used: count(draft.jars_used, Field::JarsUsed)?
            .ok_or_else(|| vec![SchemaViolation::Missing(Field::JarsUsed)])?,
        contaminated_jars: count(draft.contaminated_jars, Field::ContaminatedJars)?,
        jars_to_hardening: count(draft.jars_to_hardening, Field::JarsToHardening)?,
        notes: draft.notes,
    })
}

fn check_rule(rule: &FieldRule, value: DraftValue<'_>) -> Result<(), SchemaViolation> {
    let field = rule.field;
    match (value, rule.constraint) {
        (DraftValue::Absent, _) => match rule.presence {
            Presence::Required => Err(SchemaViolation::Missing(field)),
            Presence::Optional => Ok(()),
        },
        (DraftValue::Text(s), Constraint::NonEmptyText) => {
            if s.is_empty() || s.trim() != s {
                Err(SchemaViolation::BadText(field))
            } else {
                Ok(())
            }
        }
        (DraftValue::Text(s), Constraint::IsoDate) => {
            if is_iso_date(s) {
                Ok(())
            } else {
                Err(SchemaViolation::NotIsoDate {
                    field,
                    value: s.to_string(),
                })
            }
        }
        (DraftValue::Count(v), Constraint::CountAtLeast(min)) => {
            let max = i64::from(u32::MAX);
            if (min..=max).contains(&v) {
                Ok(())
            } else {
                Err(SchemaViolation::OutOfRange { field, value: v, min, max })
            }
        }
        _ => Err(SchemaViolation::WrongType(field)),
    }
}

fn is_iso_date(s: &str) -> bool {
    s.len() == 10
        && NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .is_ok_and(|d| d.format("%Y-%m-%d").to_string() == s)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
