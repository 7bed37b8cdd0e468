//! Test builders: Ergonomic constructors for candidate rows and normalizers.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use subsheet_core::config::{DoneByPolicy, OptionalFieldPolicy, PolicyConfig};
use subsheet_core::{CandidateRecord, DateNormalizer, Field, RecordNormalizer};

// ---------------------------------------------------------------------------
// RowBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`CandidateRecord`] test fixtures.
///
/// # Example
///
/// ```rust
/// let row = RowBuilder::valid("Fern A")
///     .done_by("Alice")
///     .contaminated("2")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct RowBuilder {
    row: CandidateRecord,
}

impl RowBuilder {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A row that passes under the default policy: name, ISO date, 5 jars.
    pub fn valid(plant: &str) -> Self {
        Self::empty().plant(plant).date("2024-06-01").jars("5")
    }

    pub fn plant(self, value: &str) -> Self {
        self.set(Field::PlantName, value)
    }

    pub fn date(self, value: &str) -> Self {
        self.set(Field::SubcultureDate, value)
    }

    pub fn done_by(self, value: &str) -> Self {
        self.set(Field::DoneBy, value)
    }

    pub fn jars(self, value: &str) -> Self {
        self.set(Field::JarsUsed, value)
    }

    pub fn contaminated(self, value: &str) -> Self {
        self.set(Field::ContaminatedJars, value)
    }

    pub fn hardening(self, value: &str) -> Self {
        self.set(Field::JarsToHardening, value)
    }

    pub fn notes(self, value: &str) -> Self {
        self.set(Field::Notes, value)
    }

    pub fn without(mut self, field: Field) -> Self {
        self.row.set(field, "");
        self
    }

    pub fn set(mut self, field: Field, value: &str) -> Self {
        self.row.set(field, value);
        self
    }

    pub fn build(self) -> CandidateRecord {
        self.row
    }
}

// ---------------------------------------------------------------------------
// Normalizers
// ---------------------------------------------------------------------------

/// Normalizer with every optional strictness switched on.
pub fn strict_normalizer() -> RecordNormalizer {
    RecordNormalizer::new(
        DateNormalizer::default(),
        PolicyConfig {
            missing_done_by: DoneByPolicy::Reject,
            invalid_optional: OptionalFieldPolicy::RejectRow,
            contamination_within_jars: true,
            ..PolicyConfig::default()
        },
    )
}

/// Default policy on the rayon pool.
pub fn parallel_normalizer() -> RecordNormalizer {
    RecordNormalizer::new(
        DateNormalizer::default(),
        PolicyConfig {
            parallel: true,
            ..PolicyConfig::default()
        },
    )
}
