//! Normalizer: Turns loosely-typed [`CandidateRecord`]s into [`ValidatedRecord`]s.
//!
//! Each row passes through, in order: the required-field gate, `jarsUsed`
//! coercion, date coercion, optional count coercion, `doneBy` / `notes`
//! handling, the optional contamination cross-check, and finally
//! [`schema::validate`]. Rows are independent; a failure anywhere rejects
//! only that row and is recorded as a [`Rejection`] with its input index.
//!
//! An empty result is never returned as success: if no row survives,
//! [`RecordNormalizer::normalize`] fails with
//! [`NormalizeError::NoValidRecords`].

use rayon::prelude::*;

use crate::config::{
    Config, ConfigError, CountParsing, DoneByPolicy, OptionalFieldPolicy, PolicyConfig,
};
use crate::date::{DateError, DateNormalizer};
use crate::schema::{self, RecordDraft, SchemaViolation};
use crate::types::{CandidateRecord, Field, ValidatedRecord};

// ---------------------------------------------------------------------------
// Count coercion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CountError {
    #[error("not a whole number")]
    NotANumber,

    #[error("{value} is below the minimum of {min}")]
    BelowMinimum { value: i64, min: i64 },
}

/// Parse a jar count from its leading integer.
///
/// Surrounding whitespace and an optional sign are accepted; everything after
/// the first run of digits is ignored, so `"10 jars"` is 10 and `"5.7"` is 5.
/// Fails when no digit follows the sign.
pub fn parse_count(raw: &str) -> Result<i64, CountError> {
    let text = raw.trim_start();
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = unsigned
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return Err(CountError::NotANumber);
    }

    let end = text.len() - unsigned.len() + digits;
    text[..end].parse::<i64>().map_err(|_| CountError::NotANumber)
}

/// Parse a jar count that must be a whole number and nothing else.
///
/// Accepts surrounding whitespace, an optional sign, and a fractional part
/// made only of zeros (`"5.0"`).
pub fn parse_count_strict(raw: &str) -> Result<i64, CountError> {
    let text = raw.trim();
    let integral = match text.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        Some(_) => return Err(CountError::NotANumber),
        None => text,
    };

    let digits = integral.strip_prefix(['+', '-']).unwrap_or(integral);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CountError::NotANumber);
    }

    integral.parse::<i64>().map_err(|_| CountError::NotANumber)
}

fn at_least(value: i64, min: i64) -> Result<i64, CountError> {
    if value < min {
        Err(CountError::BelowMinimum { value, min })
    } else {
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Rejections
// ---------------------------------------------------------------------------

/// Why a single candidate row was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowRejection {
    #[error("missing required field `{0}`")]
    MissingRequiredField(Field),

    #[error("invalid jarsUsed {raw:?}: {reason}")]
    InvalidJarsUsed { raw: String, reason: CountError },

    #[error("invalid subcultureDate: {0}")]
    InvalidDate(#[from] DateError),

    #[error("missing doneBy")]
    MissingDoneBy,

    #[error("invalid `{field}` {raw:?}: {reason}")]
    InvalidOptionalField {
        field: Field,
        raw: String,
        reason: CountError,
    },

    #[error("contaminatedJars ({contaminated}) exceeds jarsUsed ({jars_used})")]
    ContaminationExceedsJars { contaminated: i64, jars_used: i64 },

    #[error("schema validation failed: {}", join_violations(.0))]
    SchemaValidation(Vec<SchemaViolation>),
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A rejected row: its zero-based position in the input and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub row: usize,
    pub reason: RowRejection,
}

impl std::fmt::Display for Rejection {
    /// Rows are shown one-based, as a person counts records.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "record {}: {}", self.row + 1, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error(
        "no valid records in {total} candidate rows; check that the sheet has \
         plantName, subcultureDate and jarsUsed columns with valid data"
    )]
    NoValidRecords {
        total: usize,
        rejections: Vec<Rejection>,
    },
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A partially or fully successful normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    /// Accepted records, in input order.
    pub accepted: Vec<ValidatedRecord>,
    pub rejected_count: usize,
    /// One entry per rejected row, in input order.
    pub rejections: Vec<Rejection>,
}

impl Normalized {
    /// Number of candidate rows seen.
    pub fn total(&self) -> usize {
        self.accepted.len() + self.rejected_count
    }

    /// One-line summary, e.g. `38 of 50 rows accepted, 12 rejected`.
    pub fn summary(&self) -> String {
        format!(
            "{} of {} rows accepted, {} rejected",
            self.accepted.len(),
            self.total(),
            self.rejected_count
        )
    }
}

// ---------------------------------------------------------------------------
// RecordNormalizer
// ---------------------------------------------------------------------------

/// Loose-to-strict subculture record normalizer.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    dates: DateNormalizer,
    policy: PolicyConfig,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(DateNormalizer::default(), PolicyConfig::default())
    }
}

impl RecordNormalizer {
    pub fn new(dates: DateNormalizer, policy: PolicyConfig) -> Self {
        Self { dates, policy }
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::new(
            DateNormalizer::from_config(&config.dates)?,
            config.policy.clone(),
        ))
    }

    pub fn dates(&self) -> &DateNormalizer {
        &self.dates
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Normalize every row, preserving input order.
    pub fn normalize(&self, rows: &[CandidateRecord]) -> Result<Normalized, NormalizeError> {
        let outcomes: Vec<Result<ValidatedRecord, RowRejection>> = if self.policy.parallel {
            rows.par_iter().map(|row| self.normalize_row(row)).collect()
        } else {
            rows.iter().map(|row| self.normalize_row(row)).collect()
        };

        let mut accepted = Vec::with_capacity(outcomes.len());
        let mut rejections = Vec::new();
        for (row, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(record) => accepted.push(record),
                Err(reason) => {
                    tracing::debug!(row, %reason, "rejected candidate row");
                    rejections.push(Rejection { row, reason });
                }
            }
        }

        if accepted.is_empty() {
            tracing::warn!(total = rows.len(), "no valid records in candidate rows");
            return Err(NormalizeError::NoValidRecords {
                total: rows.len(),
                rejections,
            });
        }

        tracing::info!(
            accepted = accepted.len(),
            rejected = rejections.len(),
            "normalized candidate rows"
        );

        Ok(Normalized {
            rejected_count: rejections.len(),
            accepted,
            rejections,
        })
    }

    /// Normalize one row.
    pub fn normalize_row(&self, row: &CandidateRecord) -> Result<ValidatedRecord, RowRejection> {
        let plant_name = require(row, Field::PlantName)?;
        let raw_date = require(row, Field::SubcultureDate)?;
        let raw_jars = require(row, Field::JarsUsed)?;

        let jars_used = self
            .count(raw_jars)
            .and_then(|n| at_least(n, 1))
            .map_err(|reason| RowRejection::InvalidJarsUsed {
                raw: raw_jars.to_string(),
                reason,
            })?;

        let date = self.dates.parse(raw_date)?;

        let contaminated_jars = self.optional_count(row, Field::ContaminatedJars)?;
        let jars_to_hardening = self.optional_count(row, Field::JarsToHardening)?;

        let done_by = match (row.get(Field::DoneBy), self.policy.missing_done_by) {
            (Some(name), _) => name.to_string(),
            (None, DoneByPolicy::Placeholder) => self.policy.done_by_placeholder.clone(),
            (None, DoneByPolicy::Reject) => return Err(RowRejection::MissingDoneBy),
        };

        if self.policy.contamination_within_jars {
            if let Some(contaminated) = contaminated_jars.filter(|c| *c > jars_used) {
                return Err(RowRejection::ContaminationExceedsJars {
                    contaminated,
                    jars_used,
                });
            }
        }

        let draft = RecordDraft {
            plant_name: Some(plant_name.to_string()),
            subculture_date: Some(date.iso()),
            done_by: Some(done_by),
            jars_used: Some(jars_used),
            contaminated_jars,
            jars_to_hardening,
            notes: row.get(Field::Notes).map(str::to_string),
        };

        schema::validate(draft).map_err(RowRejection::SchemaValidation)
    }

    fn count(&self, raw: &str) -> Result<i64, CountError> {
        match self.policy.count_parsing {
            CountParsing::LeadingInteger => parse_count(raw),
            CountParsing::Strict => parse_count_strict(raw),
        }
    }

    /// Coerce an optional count, applying the configured policy on failure.
    fn optional_count(
        &self,
        row: &CandidateRecord,
        field: Field,
    ) -> Result<Option<i64>, RowRejection> {
        let Some(raw) = row.get(field) else {
            return Ok(None);
        };

        match self.count(raw).and_then(|n| at_least(n, 0)) {
            Ok(n) => Ok(Some(n)),
            Err(reason) => match self.policy.invalid_optional {
                OptionalFieldPolicy::DropField => {
                    tracing::debug!(%field, raw, %reason, "dropping uncoercible optional field");
                    Ok(None)
                }
                OptionalFieldPolicy::RejectRow => Err(RowRejection::InvalidOptionalField {
                    field,
                    raw: raw.to_string(),
                    reason,
                }),
            },
        }
    }
}

fn require(row: &CandidateRecord, field: Field) -> Result<&str, RowRejection> {
    row.get(field)
        .ok_or(RowRejection::MissingRequiredField(field))
}

/// Normalize `rows` with the built-in configuration.
pub fn normalize(rows: &[CandidateRecord]) -> Result<Normalized, NormalizeError> {
    RecordNormalizer::default().normalize(rows)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
