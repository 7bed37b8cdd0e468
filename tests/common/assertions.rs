//! Domain-specific assertion macros for subsheet harnesses.
//!
//! These add context-rich failure messages that make it clear which row
//! was accepted or rejected when it should not have been.

// ---------------------------------------------------------------------------
// Row outcome assertions
// ---------------------------------------------------------------------------

/// Assert that a row normalizes, returning the validated record.
///
/// ```rust
/// let record = assert_accepts!(normalizer, row);
/// ```
#[macro_export]
macro_rules! assert_accepts {
    ($normalizer:expr, $row:expr) => {{
        let row: &subsheet_core::CandidateRecord = &$row;
        match $normalizer.normalize_row(row) {
            Ok(record) => record,
            Err(reason) => panic!(
                "assert_accepts! failed: row was rejected\n  reason: {}\n  row:    {:?}",
                reason, row
            ),
        }
    }};
}

/// Assert that a row is rejected and the reason matches a pattern.
///
/// ```rust
/// assert_rejects!(normalizer, row, RowRejection::MissingDoneBy);
/// assert_rejects!(normalizer, row, RowRejection::MissingRequiredField(f) if f == Field::JarsUsed);
/// ```
#[macro_export]
macro_rules! assert_rejects {
    ($normalizer:expr, $row:expr, $pattern:pat $(if $guard:expr)?) => {{
        let row: &subsheet_core::CandidateRecord = &$row;
        match $normalizer.normalize_row(row) {
            Err(reason) => assert!(
                matches!(reason.clone(), $pattern $(if $guard)?),
                "assert_rejects! failed: wrong reason\n  expected: {}\n  actual:   {:?}\n  row:      {:?}",
                stringify!($pattern),
                reason,
                row
            ),
            Ok(record) => panic!(
                "assert_rejects! failed: row was accepted\n  record: {:?}\n  row:    {:?}",
                record, row
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Batch assertions
// ---------------------------------------------------------------------------

/// Assert the accepted plant names of a [`subsheet_core::Normalized`], in order.
#[macro_export]
macro_rules! assert_plants {
    ($normalized:expr, [$($name:expr),* $(,)?]) => {{
        let actual: Vec<&str> = $normalized.accepted.iter().map(|r| r.plant_name()).collect();
        let expected: Vec<&str> = vec![$($name),*];
        pretty_assertions::assert_eq!(actual, expected, "accepted plant names differ");
    }};
}

/// Assert the zero-based rows that were rejected, in order.
#[macro_export]
macro_rules! assert_rejected_rows {
    ($rejections:expr, [$($row:expr),* $(,)?]) => {{
        let actual: Vec<usize> = $rejections.iter().map(|r| r.row).collect();
        let expected: Vec<usize> = vec![$($row),*];
        pretty_assertions::assert_eq!(actual, expected, "rejected rows differ");
    }};
}
