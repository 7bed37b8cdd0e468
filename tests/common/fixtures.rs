//! Static payload corpora used across harnesses.
//!
//! Each payload is what the extraction step might hand over for one sheet.
//! The HIGH_VOLUME generator is large enough to exercise the parallel path
//! without being slow under `cargo test`.

/// A clean sheet in the `{"records": [...]}` envelope.
pub const PAYLOAD_CLEAN: &str = r#"{
  "records": [
    {"plantName": "Fern A", "subcultureDate": "Jun 01, 2024", "doneBy": "Alice", "jarsUsed": "10", "contaminatedJars": "2"},
    {"plantName": "Orchid 7", "subcultureDate": "2024-06-03", "doneBy": "Priya", "jarsUsed": "24", "jarsToHardening": "6", "notes": "split clumps"},
    {"plantName": "Moss", "subcultureDate": "06/04/2024", "doneBy": "Tomás", "jarsUsed": "3"}
  ]
}"#;

/// A messy sheet: one good row, then one row per way a row can fail.
pub const PAYLOAD_MIXED: &str = r#"{
  "records": [
    {"plantName": "Fern A", "subcultureDate": "Jun 01, 2024", "doneBy": "Alice", "jarsUsed": "10", "contaminatedJars": "2"},
    {"plantName": "Fern B", "subcultureDate": "31/02/2024", "jarsUsed": "4"},
    {"subcultureDate": "2024-06-01", "jarsUsed": "4"},
    {"plantName": "Moss", "subcultureDate": "2024-06-01", "jarsUsed": "zero"},
    {"plantName": "Moss", "subcultureDate": "2024-06-01", "jarsUsed": "0"},
    {"plantName": "Ivy", "subcultureDate": "1st June 2024", "jarsUsed": 5, "contaminatedJars": "n/a"}
  ]
}"#;

/// The same rows as [`PAYLOAD_CLEAN`], as model output with a fenced block.
pub const PAYLOAD_FENCED: &str = "Sure! Here is the extracted data:\n\n```json\n[\n  {\"plantName\": \"Fern A\", \"subcultureDate\": \"Jun 01, 2024\", \"jarsUsed\": 10}\n]\n```\n\nLet me know if you need anything else.";

/// A sheet whose headers did not map to the expected columns.
pub const PAYLOAD_WRONG_HEADERS: &str = r#"{
  "records": [
    {"Plant": "Fern A", "Date": "2024-06-01", "Jars": "10"},
    {"Plant": "Fern B", "Date": "2024-06-02", "Jars": "4"}
  ]
}"#;

/// Dates that must resolve, paired with their canonical form.
pub const DATES_VALID: &[(&str, &str)] = &[
    ("Jun 01, 2024", "2024-06-01"),
    ("2024-06-01", "2024-06-01"),
    ("06/01/2024", "2024-06-01"),
    ("13/06/2024", "2024-06-13"),
    ("1 Jun 2024", "2024-06-01"),
    ("1-Jun-24", "2024-06-01"),
    ("01.06.2024", "2024-06-01"),
    ("June 1st, 2024", "2024-06-01"),
    ("  JUN  1,   2024 ", "2024-06-01"),
];

/// Text that must never resolve to a date.
pub const DATES_INVALID: &[&str] = &[
    "31/02/2024",
    "04/31/2024",
    "13/13/2024",
    "02/29/2023",
    "next tuesday",
    "tbd",
];

/// Generate `n` valid candidate rows in a `{"records": [...]}` envelope.
/// Every seventh row has `jarsUsed` of zero and is rejected.
pub fn payload_high_volume(n: usize) -> String {
    let records: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let done_by = if i % 3 == 0 { "" } else { "Alice" };
            serde_json::json!({
                "plantName": format!("Plant {i}"),
                "subcultureDate": format!("{:02}/{:02}/2024", i % 12 + 1, i % 28 + 1),
                "doneBy": done_by,
                "jarsUsed": (i % 7).to_string(),
                "contaminatedJars": (i % 2).to_string(),
            })
        })
        .collect();
    serde_json::json!({ "records": records }).to_string()
}

/// Write `payload` to `name` inside `dir` and return the path.
pub fn write_payload(dir: &std::path::Path, name: &str, payload: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, payload).expect("write payload fixture");
    path
}
