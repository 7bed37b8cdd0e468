//! subsheet: Lab sheet import pipeline.
//!
//! Glue between the candidate sources in [`subsheet_feeds`], the normalizer
//! in [`subsheet_core`], and the [`report`] renderers. The `subsheet` binary
//! is a thin clap wrapper around [`run`].
//!
//! ```text
//! CandidateSource ──► RecordNormalizer ──► report (stdout)
//!                            │
//!                            └──► rejection report (stderr)
//! ```

pub mod report;

pub use report::OutputFormat;

use std::io::Write;

use subsheet_core::{NormalizeError, RecordNormalizer};
use subsheet_feeds::CandidateSource;

/// Result of one pipeline run that got as far as normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// At least one record was accepted and written.
    Accepted { accepted: usize, rejected: usize },
    /// Every row was rejected; nothing was written to `out`.
    NoValidRecords { total: usize },
}

/// Read candidates from `source`, normalize them, and write the accepted
/// records to `out` in `format`. The summary and rejection report go to
/// `diagnostics` unless `quiet` is set; a no-valid-records failure is always
/// reported.
///
/// Errors are I/O or payload failures; an all-rejected input is an
/// [`RunOutcome::NoValidRecords`], not an error.
pub fn run(
    source: &mut dyn CandidateSource,
    normalizer: &RecordNormalizer,
    format: OutputFormat,
    quiet: bool,
    out: &mut dyn Write,
    diagnostics: &mut dyn Write,
) -> anyhow::Result<RunOutcome> {
    let name = source.name();
    let rows = source.read_candidates()?;
    tracing::info!(source = %name, rows = rows.len(), "read candidate rows");

    match normalizer.normalize(&rows) {
        Ok(normalized) => {
            report::render(format, &normalized.accepted, out)?;
            out.flush()?;
            if !quiet {
                report::write_report(&normalized, diagnostics)?;
            }
            Ok(RunOutcome::Accepted {
                accepted: normalized.accepted.len(),
                rejected: normalized.rejected_count,
            })
        }
        Err(err) => {
            report::write_failure(&err, diagnostics)?;
            let NormalizeError::NoValidRecords { total, .. } = err;
            Ok(RunOutcome::NoValidRecords { total })
        }
    }
}
