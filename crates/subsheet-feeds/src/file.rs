use std::path::PathBuf;

use subsheet_core::CandidateRecord;

use crate::{extraction, CandidateSource, FeedError};

/// Reads an extraction payload from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CandidateSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn read_candidates(&mut self) -> Result<Vec<CandidateRecord>, FeedError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| FeedError::Io {
            name: self.name(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), bytes = text.len(), "read payload file");
        extraction::decode_payload(&text)
    }
}
