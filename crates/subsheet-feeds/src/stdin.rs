use subsheet_core::CandidateRecord;

use crate::{extraction, CandidateSource, FeedError};

/// Reads an extraction payload from standard input until EOF.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinSource;

impl StdinSource {
    pub fn new() -> Self {
        Self
    }
}

impl CandidateSource for StdinSource {
    fn name(&self) -> String {
        "stdin".to_string()
    }

    fn read_candidates(&mut self) -> Result<Vec<CandidateRecord>, FeedError> {
        extraction::decode_reader(std::io::stdin().lock(), "stdin")
    }
}
