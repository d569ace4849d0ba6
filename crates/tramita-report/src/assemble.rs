//! Joins enriched proposals into the display-labelled report table.

use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Array, StringArray, TimestampSecondArray};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use tracing::debug;
use tramita_core::render::{self, DetailFields};
use tramita_core::{
    AuthorEntry, HistoryEntry, LooseInt, Lookup, Proposal, ProposalStatus, parse_last_action,
    report, timestamp,
};

use crate::ReportError;

/// One proposal with every enrichment rendered to cell text.
///
/// `number` and `year` stay raw until [`assemble`] coerces them.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: i64,
    pub kind: String,
    pub number: LooseInt,
    pub year: LooseInt,
    pub author: String,
    pub summary: Option<String>,
    pub detail: DetailFields,
    pub history: String,
    pub related: String,
}

impl ReportRow {
    pub fn new(
        proposal: Proposal,
        status: &Lookup<ProposalStatus>,
        authors: &Lookup<Vec<AuthorEntry>>,
        related: &Lookup<Vec<i64>>,
        history: &Lookup<Vec<HistoryEntry>>,
    ) -> Self {
        Self {
            id: proposal.id,
            kind: proposal.kind,
            number: proposal.number,
            year: proposal.year,
            author: render::author_name(authors),
            summary: proposal.summary,
            detail: render::detail_fields(status),
            history: render::history_block(history),
            related: render::related_ids(related),
        }
    }

    fn sort_key(&self) -> Option<NaiveDateTime> {
        self.detail
            .last_action_at
            .as_deref()
            .and_then(parse_last_action)
    }
}

/// The finished report: one Arrow batch with display-labelled columns,
/// most recent last action first.
#[derive(Debug, Clone)]
pub struct Report {
    batch: RecordBatch,
}

impl Report {
    /// A report with the full schema and no rows.
    pub fn empty() -> Self {
        Self {
            batch: RecordBatch::new_empty(Arc::new(report::labelled_schema())),
        }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.batch.num_rows() == 0
    }

    /// Proposal ids in report order.
    pub fn ids(&self) -> Vec<i64> {
        self.batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.values().to_vec())
            .unwrap_or_default()
    }

    /// The single-row slice for one proposal, if present.
    pub fn row_for(&self, id: i64) -> Option<RecordBatch> {
        let idx = self.ids().iter().position(|&x| x == id)?;
        Some(self.batch.slice(idx, 1))
    }
}

fn coerce(row: &ReportRow, column: &'static str, raw: &LooseInt) -> Result<i64, ReportError> {
    raw.coerce().ok_or_else(|| ReportError::Coercion {
        id: row.id,
        column,
        value: raw.to_string(),
    })
}

/// Build the report table from enriched rows.
///
/// Rows are ordered by last-action timestamp, newest first; rows whose
/// timestamp is missing or unparseable keep their relative order at the
/// bottom. A number or year that is not an integer fails the whole build.
pub fn assemble(rows: Vec<ReportRow>) -> Result<Report, ReportError> {
    if rows.is_empty() {
        return Ok(Report::empty());
    }

    let mut keyed: Vec<(Option<NaiveDateTime>, ReportRow)> =
        rows.into_iter().map(|r| (r.sort_key(), r)).collect();
    // Option orders None first, so a reversed comparison sends it last.
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut numbers = Vec::with_capacity(keyed.len());
    let mut years = Vec::with_capacity(keyed.len());
    for (_, row) in &keyed {
        numbers.push(coerce(row, report::NUMBER.key, &row.number)?);
        years.push(coerce(row, report::YEAR.key, &row.year)?);
    }

    let undated = keyed.iter().filter(|(k, _)| k.is_none()).count();
    debug!(rows = keyed.len(), undated, "assembling report");

    let detail = |f: fn(&DetailFields) -> &Option<String>| -> ArrayRef {
        Arc::new(StringArray::from(
            keyed
                .iter()
                .map(|(_, r)| f(&r.detail).clone())
                .collect::<Vec<_>>(),
        ))
    };
    let text = |f: fn(&ReportRow) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(
            keyed.iter().map(|(_, r)| f(r)).collect::<Vec<_>>(),
        ))
    };

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(
            keyed.iter().map(|(_, r)| r.id).collect::<Vec<_>>(),
        )),
        text(|r| r.kind.as_str()),
        Arc::new(Int64Array::from(numbers)),
        Arc::new(Int64Array::from(years)),
        text(|r| r.author.as_str()),
        Arc::new(StringArray::from(
            keyed
                .iter()
                .map(|(_, r)| r.summary.clone())
                .collect::<Vec<_>>(),
        )),
        Arc::new(TimestampSecondArray::from(
            keyed
                .iter()
                .map(|(k, _)| k.as_ref().map(timestamp::epoch_seconds))
                .collect::<Vec<_>>(),
        )),
        detail(|d| &d.last_action),
        detail(|d| &d.current_status),
        detail(|d| &d.last_dispatch),
        detail(|d| &d.last_review),
        text(|r| r.history.as_str()),
        text(|r| r.related.as_str()),
    ];

    let keyed_batch = RecordBatch::try_new(Arc::new(report::keyed_schema()), columns)?;
    // Display labels replace the internal keys as the last step.
    let batch = RecordBatch::try_new(
        Arc::new(report::labelled_schema()),
        keyed_batch.columns().to_vec(),
    )?;
    Ok(Report { batch })
}
