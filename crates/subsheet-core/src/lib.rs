//! subsheet-core: Loose-to-strict subculture record normalization.
//!
//! This crate turns rows extracted from a tissue-culture lab sheet into
//! records that are safe to store, plus the shared types both sides use.
//!
//! # Pipeline
//!
//! ```text
//! CandidateRecord ──► RecordNormalizer ──► schema::validate ──► ValidatedRecord
//!                          │
//!                          └──► DateNormalizer
//! ```
//!
//! Every stage is a pure function of its input and the loaded [`Config`].

pub mod config;
pub mod date;
pub mod normalizer;
pub mod schema;
pub mod types;

pub use config::Config;
pub use date::{parse_flexible_date, DateError, DateMatch, DateNormalizer, MatchedBy};
pub use normalizer::{
    normalize, NormalizeError, Normalized, RecordNormalizer, Rejection, RowRejection,
};
pub use types::{CandidateRecord, Field, ValidatedRecord};
