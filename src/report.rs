//! Rendering of accepted records and the rejection report.
//!
//! The table preview mirrors what a reviewer checks before an import is
//! committed. JSON and JSON Lines are for handing records to a store.

use std::io::Write;

use subsheet_core::{NormalizeError, Normalized, ValidatedRecord};

/// How accepted records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned preview table.
    #[default]
    Table,
    /// One pretty-printed JSON array.
    Json,
    /// One JSON object per line.
    Jsonl,
}

const HEADERS: [&str; 7] = [
    "Plant Name",
    "Date",
    "Done By",
    "Jars",
    "Contaminated",
    "To Hardening",
    "Notes",
];

const ABSENT: &str = "-";

pub fn render(
    format: OutputFormat,
    records: &[ValidatedRecord],
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => render_table(records, out),
        OutputFormat::Json => render_json(records, out),
        OutputFormat::Jsonl => render_jsonl(records, out),
    }
}

pub fn render_table(records: &[ValidatedRecord], out: &mut dyn Write) -> anyhow::Result<()> {
    let rows: Vec<[String; 7]> = records.iter().map(table_row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_line(out, &HEADERS.map(str::to_string), &widths)?;
    let rule = widths.map(|w| "-".repeat(w));
    write_line(out, &rule, &widths)?;
    for row in &rows {
        write_line(out, row, &widths)?;
    }
    Ok(())
}

pub fn render_json(records: &[ValidatedRecord], out: &mut dyn Write) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, records)?;
    writeln!(out)?;
    Ok(())
}

pub fn render_jsonl(records: &[ValidatedRecord], out: &mut dyn Write) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    Ok(())
}

fn table_row(record: &ValidatedRecord) -> [String; 7] {
    let count = |n: Option<u32>| n.map_or_else(|| ABSENT.to_string(), |n| n.to_string());
    [
        record.plant_name().to_string(),
        record.subculture_date().to_string(),
        record.done_by().to_string(),
        record.jars_used().to_string(),
        count(record.contaminated_jars()),
        count(record.jars_to_hardening()),
        record.notes().unwrap_or(ABSENT).to_string(),
    ]
}

fn write_line(out: &mut dyn Write, cells: &[String; 7], widths: &[usize; 7]) -> std::io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

// ---------------------------------------------------------------------------
// Rejection report
// ---------------------------------------------------------------------------

/// Summary line followed by one line per rejected row.
pub fn write_report(normalized: &Normalized, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "{}", normalized.summary())?;
    for rejection in &normalized.rejections {
        writeln!(out, "  {rejection}")?;
    }
    Ok(())
}

/// Report for a run that accepted nothing.
pub fn write_failure(error: &NormalizeError, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(out, "error: {error}")?;
    let NormalizeError::NoValidRecords { rejections, .. } = error;
    for rejection in rejections {
        writeln!(out, "  {rejection}")?;
    }
    Ok(())
}
