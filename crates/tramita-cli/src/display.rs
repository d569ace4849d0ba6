//! Terminal rendering of the proposal report.
//!
//! `print_summary` shows the whole report as a compact table; `print_proposal_card`
//! renders a single-row slice as a grouped vertical card with the procedural
//! history laid out one event per line.

use arrow::array::{Array, StringArray};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use arrow::util::display::{ArrayFormatter, FormatOptions};
use tramita_core::render::HISTORY_SEPARATOR;
use tramita_core::report::{self, Column};
use tramita_report::Report;

const MAX_HISTORY_ITEMS: usize = 10;

// ── Card section groupings ──

const IDENTITY: &[Column] = &[
    report::ID,
    report::KIND,
    report::NUMBER,
    report::YEAR,
    report::AUTHOR,
];

const STATUS: &[Column] = &[
    report::LAST_ACTION_AT,
    report::LAST_ACTION,
    report::CURRENT_STATUS,
    report::LAST_DISPATCH,
    report::LAST_REVIEW,
];

const RELATIONSHIPS: &[Column] = &[report::RELATED];

/// Columns shown by `tramita report`.
const SUMMARY: &[Column] = &[
    report::ID,
    report::KIND,
    report::NUMBER,
    report::YEAR,
    report::AUTHOR,
    report::LAST_ACTION_AT,
    report::CURRENT_STATUS,
];

// ── Public API ──

/// Print the report as a table of its summary columns.
pub fn print_summary(report: &Report) -> anyhow::Result<()> {
    if report.is_empty() {
        println!("No proposals were loaded from the API.");
        return Ok(());
    }
    let batch = report.batch();
    let schema = batch.schema();
    let indices = SUMMARY
        .iter()
        .map(|c| schema.index_of(c.label))
        .collect::<Result<Vec<_>, _>>()?;
    let projected = batch.project(&indices)?;
    println!("{}", arrow::util::pretty::pretty_format_batches(&[projected])?);
    println!("{} proposals", report.num_rows());
    Ok(())
}

/// Print a single proposal row as a vertical card grouped by section.
pub fn print_proposal_card(batch: &RecordBatch) -> anyhow::Result<()> {
    let kind = get_utf8(batch, report::KIND.label).unwrap_or_default();
    let number = formatted(batch, report::NUMBER.label).unwrap_or_default();
    let year = formatted(batch, report::YEAR.label).unwrap_or_default();
    let summary = get_utf8(batch, report::SUMMARY.label).unwrap_or_default();

    println!("=== {kind} {number}/{year} ===");
    if !summary.is_empty() {
        println!("{summary}");
    }
    println!();

    print_section(batch, "Identity", IDENTITY);
    print_section(batch, "Status", STATUS);
    print_section(batch, "Relationships", RELATIONSHIPS);
    print_history(batch);

    Ok(())
}

// ── Section rendering ──

fn print_section(batch: &RecordBatch, header: &str, cols: &[Column]) {
    // Skip sections where every cell is null or empty.
    let has_data = cols
        .iter()
        .any(|c| formatted(batch, c.label).is_some_and(|v| !v.is_empty()));
    if !has_data {
        return;
    }

    println!("{header}");
    for col in cols {
        match formatted(batch, col.label) {
            Some(value) if !value.is_empty() => println!("  {:<22} {}", col.label, value),
            _ => continue,
        }
    }
    println!();
}

fn print_history(batch: &RecordBatch) {
    let Some(history) = get_utf8(batch, report::HISTORY.label) else {
        return;
    };
    if history.is_empty() {
        return;
    }

    let events: Vec<&str> = history.split(HISTORY_SEPARATOR).collect();
    println!("{} ({}):", report::HISTORY.label, events.len());

    // Upstream order is oldest first; show the most recent events.
    let skipped = events.len().saturating_sub(MAX_HISTORY_ITEMS);
    if skipped > 0 {
        println!("    ... {skipped} earlier events");
    }
    for event in &events[skipped..] {
        println!("    {event}");
    }
    println!();
}

// ── Helpers ──

/// Display text of a cell in row 0, or `None` when the column is absent or null.
fn formatted(batch: &RecordBatch, label: &str) -> Option<String> {
    let idx = batch.schema().index_of(label).ok()?;
    let col = batch.column(idx);
    if col.is_empty() || col.is_null(0) {
        return None;
    }
    let options = FormatOptions::default().with_timestamp_format(Some("%Y-%m-%d %H:%M"));
    let fmt = ArrayFormatter::try_new(col.as_ref(), &options).ok()?;
    Some(fmt.value(0).to_string())
}

fn get_utf8(batch: &RecordBatch, label: &str) -> Option<String> {
    let idx = batch.schema().index_of(label).ok()?;
    let col = batch.column(idx);
    if col.is_empty() || col.is_null(0) || col.data_type() != &DataType::Utf8 {
        return None;
    }
    col.as_any()
        .downcast_ref::<StringArray>()
        .map(|a| a.value(0).to_string())
}
