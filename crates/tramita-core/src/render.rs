//! Presentation of lookup outcomes as report cell text.
//!
//! The placeholder wording is part of the report's display contract and must
//! not change: readers and downstream spreadsheets filter on it.

use crate::{AuthorEntry, HistoryEntry, Lookup, ProposalStatus};

pub const NO_DATE: &str = "no date";
pub const NO_ACTION: &str = "no action";
pub const NO_STATUS: &str = "no status";
pub const NO_DISPATCH: &str = "no dispatch";
pub const NO_REVIEW: &str = "no review decision";
pub const NO_AUTHORS: &str = "no authors";
pub const NO_AUTHOR_NAME: &str = "no author name";
pub const AUTHOR_ERROR: &str = "error retrieving data";
pub const HISTORY_ERROR: &str = "error retrieving history";

/// Separator between rendered history events.
pub const HISTORY_SEPARATOR: &str = "\n\n";

/// The five status cells of a report row.
///
/// `None` means the cell is blank, which only happens when the detail lookup
/// itself failed; a successful lookup with missing fields yields placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub last_action_at: Option<String>,
    pub last_action: Option<String>,
    pub current_status: Option<String>,
    pub last_dispatch: Option<String>,
    pub last_review: Option<String>,
}

fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
    value.clone().unwrap_or_else(|| placeholder.to_string())
}

pub fn detail_fields(lookup: &Lookup<ProposalStatus>) -> DetailFields {
    match lookup {
        Lookup::Found(st) => DetailFields {
            last_action_at: Some(or_placeholder(&st.last_action_at, NO_DATE)),
            last_action: Some(or_placeholder(&st.last_action, NO_ACTION)),
            current_status: Some(or_placeholder(&st.current_status, NO_STATUS)),
            last_dispatch: Some(or_placeholder(&st.last_dispatch, NO_DISPATCH)),
            last_review: Some(or_placeholder(&st.last_review, NO_REVIEW)),
        },
        Lookup::Missing | Lookup::Failed(_) => DetailFields::default(),
    }
}

pub fn author_name(lookup: &Lookup<Vec<AuthorEntry>>) -> String {
    match lookup {
        Lookup::Found(authors) => match authors.first() {
            Some(first) => or_placeholder(&first.name, NO_AUTHOR_NAME),
            None => NO_AUTHORS.to_string(),
        },
        Lookup::Missing => NO_AUTHORS.to_string(),
        Lookup::Failed(_) => AUTHOR_ERROR.to_string(),
    }
}

/// Related ids joined by `", "`.
///
/// A failed lookup renders exactly like an empty relation set.
pub fn related_ids(lookup: &Lookup<Vec<i64>>) -> String {
    match lookup {
        Lookup::Found(ids) => ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        Lookup::Missing | Lookup::Failed(_) => String::new(),
    }
}

pub fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "Date/Time: {}, Action: {}, Review: {}, Dispatch: {}",
        entry.timestamp.as_deref().unwrap_or(NO_DATE),
        entry.description.as_deref().unwrap_or(NO_ACTION),
        entry.review.as_deref().unwrap_or(NO_REVIEW),
        entry.dispatch.as_deref().unwrap_or(NO_DISPATCH),
    )
}

/// All history events, in upstream order, separated by blank lines.
pub fn history_block(lookup: &Lookup<Vec<HistoryEntry>>) -> String {
    match lookup {
        Lookup::Found(entries) => entries
            .iter()
            .map(history_line)
            .collect::<Vec<_>>()
            .join(HISTORY_SEPARATOR),
        Lookup::Missing | Lookup::Failed(_) => HISTORY_ERROR.to_string(),
    }
}
