//! Test doubles and column readers shared by the report tests.

use std::collections::HashMap;
use std::sync::Mutex;

use arrow::array::{Array, Int64Array, StringArray, TimestampSecondArray};
use async_trait::async_trait;
use tramita_core::{
    AuthorEntry, HistoryEntry, LooseInt, Proposal, ProposalSeed, ProposalStatus, RelatedEntry,
};
use tramita_sync::{ProposalSource, SyncError};

use crate::Report;

/// Canned answers keyed by seed or id; `Err(code)` answers with that HTTP status.
/// Anything not configured answers with an empty success.
#[derive(Default)]
pub struct FakeSource {
    search: HashMap<ProposalSeed, Result<Vec<Proposal>, u16>>,
    status: HashMap<i64, Result<ProposalStatus, u16>>,
    authors: HashMap<i64, Result<Vec<AuthorEntry>, u16>>,
    related: HashMap<i64, Result<Vec<RelatedEntry>, u16>>,
    history: HashMap<i64, Result<Vec<HistoryEntry>, u16>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_search(mut self, seed: ProposalSeed, answer: Result<Vec<Proposal>, u16>) -> Self {
        self.search.insert(seed, answer);
        self
    }

    pub fn with_status(mut self, id: i64, answer: Result<ProposalStatus, u16>) -> Self {
        self.status.insert(id, answer);
        self
    }

    pub fn with_authors(mut self, id: i64, answer: Result<Vec<AuthorEntry>, u16>) -> Self {
        self.authors.insert(id, answer);
        self
    }

    pub fn with_related(mut self, id: i64, answer: Result<Vec<RelatedEntry>, u16>) -> Self {
        self.related.insert(id, answer);
        self
    }

    pub fn with_history(mut self, id: i64, answer: Result<Vec<HistoryEntry>, u16>) -> Self {
        self.history.insert(id, answer);
        self
    }

    /// Every remote call made so far, as `operation:argument`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

fn answer<T: Clone + Default>(found: Option<&Result<T, u16>>) -> Result<T, SyncError> {
    match found {
        Some(Ok(v)) => Ok(v.clone()),
        Some(Err(code)) => Err(SyncError::Server {
            status: *code,
            body: String::new(),
        }),
        None => Ok(T::default()),
    }
}

#[async_trait]
impl ProposalSource for FakeSource {
    async fn search(&self, seed: &ProposalSeed) -> Result<Vec<Proposal>, SyncError> {
        self.record(format!("search:{seed}"));
        answer(self.search.get(seed))
    }

    async fn status(&self, id: i64) -> Result<ProposalStatus, SyncError> {
        self.record(format!("status:{id}"));
        answer(self.status.get(&id))
    }

    async fn authors(&self, id: i64) -> Result<Vec<AuthorEntry>, SyncError> {
        self.record(format!("authors:{id}"));
        answer(self.authors.get(&id))
    }

    async fn related(&self, id: i64) -> Result<Vec<RelatedEntry>, SyncError> {
        self.record(format!("related:{id}"));
        answer(self.related.get(&id))
    }

    async fn history(&self, id: i64) -> Result<Vec<HistoryEntry>, SyncError> {
        self.record(format!("history:{id}"));
        answer(self.history.get(&id))
    }
}

pub fn proposal(id: i64, kind: &str, number: i64, year: i64) -> Proposal {
    Proposal {
        id,
        kind: kind.to_string(),
        number: LooseInt::Int(number),
        year: LooseInt::Int(year),
        summary: Some(format!("{kind} {number}/{year}")),
    }
}

pub fn status(when: &str, action: &str, situation: &str, dispatch: &str) -> ProposalStatus {
    ProposalStatus {
        last_action_at: Some(when.into()),
        last_action: Some(action.into()),
        current_status: Some(situation.into()),
        last_dispatch: Some(dispatch.into()),
        last_review: None,
    }
}

fn column<'a, T: 'static>(report: &'a Report, label: &str) -> &'a T {
    let batch = report.batch();
    let idx = batch.schema().index_of(label).unwrap();
    batch.column(idx).as_any().downcast_ref::<T>().unwrap()
}

pub fn str_col(report: &Report, label: &str) -> Vec<Option<String>> {
    let arr: &StringArray = column(report, label);
    (0..arr.len())
        .map(|i| (!arr.is_null(i)).then(|| arr.value(i).to_string()))
        .collect()
}

pub fn i64_col(report: &Report, label: &str) -> Vec<i64> {
    let arr: &Int64Array = column(report, label);
    arr.values().to_vec()
}

pub fn timestamp_col(report: &Report) -> Vec<Option<i64>> {
    let arr: &TimestampSecondArray = column(report, "Last action date");
    (0..arr.len())
        .map(|i| (!arr.is_null(i)).then(|| arr.value(i)))
        .collect()
}
