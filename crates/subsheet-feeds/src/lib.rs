//! subsheet-feeds: Candidate row sources for subsheet.
//!
//! Each source reads the extraction step's JSON payload from somewhere and
//! decodes it into [`subsheet_core::CandidateRecord`]s for the normalizer.
//! Sources do all of the pipeline's I/O; nothing downstream touches the
//! filesystem.

pub mod extraction;
pub mod file;
pub mod stdin;

pub use extraction::{decode_payload, decode_reader};
pub use file::FileSource;
pub use stdin::StdinSource;

use subsheet_core::CandidateRecord;

/// Trait implemented by each candidate source.
pub trait CandidateSource {
    /// Human-readable name used in logs and error messages.
    fn name(&self) -> String;

    /// Read the whole payload and decode it into candidate rows, in order.
    fn read_candidates(&mut self) -> Result<Vec<CandidateRecord>, FeedError>;
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no JSON payload found (expected an object, an array, or a ```json block)")]
    NoJson,

    #[error("malformed JSON payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected payload shape: {0}")]
    WrongShape(String),
}
