//! Seed resolution and the four per-proposal enrichment lookups.
//!
//! Every lookup goes through a per-pipeline [`TtlCache`], so repeated builds
//! within the cache window reuse earlier answers, failures included, without
//! touching the network. Diagnostics for failed lookups go to `tracing` and
//! are only emitted when the remote call actually happens.

use std::future::Future;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use tramita_core::{AuthorEntry, HistoryEntry, Lookup, Proposal, ProposalSeed, ProposalStatus};
use tramita_sync::{ProposalSource, SyncError, TtlCache};

use crate::{Report, ReportError, ReportRow, assemble};

/// How long a lookup result stays valid.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub cache_ttl: Duration,
    /// Run the four lookups of one proposal concurrently. Proposals are
    /// still enriched one after another.
    pub concurrent_lookups: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            cache_ttl: DEFAULT_CACHE_TTL,
            concurrent_lookups: false,
        }
    }
}

struct LookupCache {
    seeds: TtlCache<ProposalSeed, Lookup<Proposal>>,
    status: TtlCache<i64, Lookup<ProposalStatus>>,
    authors: TtlCache<i64, Lookup<Vec<AuthorEntry>>>,
    related: TtlCache<i64, Lookup<Vec<i64>>>,
    history: TtlCache<i64, Lookup<Vec<HistoryEntry>>>,
}

impl LookupCache {
    fn new(ttl: Duration) -> Self {
        Self {
            seeds: TtlCache::new(ttl),
            status: TtlCache::new(ttl),
            authors: TtlCache::new(ttl),
            related: TtlCache::new(ttl),
            history: TtlCache::new(ttl),
        }
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        self.seeds.purge_expired(now)
            + self.status.purge_expired(now)
            + self.authors.purge_expired(now)
            + self.related.purge_expired(now)
            + self.history.purge_expired(now)
    }
}

fn failed<T>(operation: &str, id: i64, err: SyncError) -> Lookup<T> {
    warn!(operation, id, status = ?err.status(), error = %err, "lookup failed");
    Lookup::Failed(err.to_string())
}

/// Builds reports from a [`ProposalSource`].
pub struct Pipeline<S> {
    source: S,
    cache: Mutex<LookupCache>,
    options: PipelineOptions,
}

impl<S: ProposalSource> Pipeline<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, PipelineOptions::default())
    }

    pub fn with_options(source: S, options: PipelineOptions) -> Self {
        Self {
            source,
            cache: Mutex::new(LookupCache::new(options.cache_ttl)),
            options,
        }
    }

    fn lock_cache(&self) -> MutexGuard<'_, LookupCache> {
        // The cache holds plain values; a panic mid-insert leaves nothing torn.
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn memo<K, V, F, Fut>(
        &self,
        pick: fn(&mut LookupCache) -> &mut TtlCache<K, V>,
        key: K,
        fetch: F,
    ) -> V
    where
        K: Eq + Hash,
        V: Clone,
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let hit = {
            let mut cache = self.lock_cache();
            pick(&mut cache).get(&key, Instant::now())
        };
        if let Some(value) = hit {
            return value;
        }
        let value = fetch().await;
        let mut cache = self.lock_cache();
        pick(&mut cache).insert(key, value.clone(), Instant::now());
        value
    }

    /// Build the full report for `seeds`.
    ///
    /// Seeds that do not resolve are dropped; when none resolve the report is
    /// empty and no enrichment lookup is issued.
    pub async fn build(&self, seeds: &[ProposalSeed]) -> Result<Report, ReportError> {
        // Ids that drop out of the seed set are never read again.
        let purged = self.lock_cache().purge_expired(Instant::now());
        if purged > 0 {
            debug!(purged, "dropped expired lookups");
        }

        let proposals = self.resolve_seeds(seeds).await;
        info!(
            seeds = seeds.len(),
            resolved = proposals.len(),
            "resolved proposals"
        );
        if proposals.is_empty() {
            warn!("no proposals were loaded from the API");
            return Ok(Report::empty());
        }

        let mut rows = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            rows.push(self.enrich(proposal).await);
        }
        let report = assemble(rows)?;
        info!(rows = report.num_rows(), "report assembled");
        Ok(report)
    }

    /// Resolve each seed to its first search match, keeping seed order.
    pub async fn resolve_seeds(&self, seeds: &[ProposalSeed]) -> Vec<Proposal> {
        let mut proposals = Vec::with_capacity(seeds.len());
        for seed in seeds {
            if let Lookup::Found(p) = self.resolve(seed).await {
                proposals.push(p);
            }
        }
        proposals
    }

    pub async fn resolve(&self, seed: &ProposalSeed) -> Lookup<Proposal> {
        self.memo(|c| &mut c.seeds, *seed, || async {
            match self.source.search(seed).await {
                Ok(found) => match found.into_iter().next() {
                    Some(p) => Lookup::Found(p),
                    None => {
                        warn!(operation = "search", seed = %seed, "no proposal matched seed");
                        Lookup::Missing
                    }
                },
                Err(err) => {
                    warn!(
                        operation = "search",
                        seed = %seed,
                        status = ?err.status(),
                        error = %err,
                        "lookup failed"
                    );
                    Lookup::Failed(err.to_string())
                }
            }
        })
        .await
    }

    /// Fetch every enrichment for `proposal` and render its report row.
    pub async fn enrich(&self, proposal: Proposal) -> ReportRow {
        let id = proposal.id;
        debug!(id, "enriching proposal");
        let (status, authors, related, history) = if self.options.concurrent_lookups {
            futures::join!(
                self.detail(id),
                self.authors(id),
                self.related(id),
                self.history(id)
            )
        } else {
            (
                self.detail(id).await,
                self.authors(id).await,
                self.related(id).await,
                self.history(id).await,
            )
        };
        ReportRow::new(proposal, &status, &authors, &related, &history)
    }

    /// Current procedural status.
    pub async fn detail(&self, id: i64) -> Lookup<ProposalStatus> {
        self.memo(|c| &mut c.status, id, || async {
            match self.source.status(id).await {
                Ok(status) => Lookup::Found(status),
                Err(err) => failed("status", id, err),
            }
        })
        .await
    }

    /// Author list; an empty list is [`Lookup::Missing`].
    pub async fn authors(&self, id: i64) -> Lookup<Vec<AuthorEntry>> {
        self.memo(|c| &mut c.authors, id, || async {
            match self.source.authors(id).await {
                Ok(authors) if authors.is_empty() => Lookup::Missing,
                Ok(authors) => Lookup::Found(authors),
                Err(err) => failed("authors", id, err),
            }
        })
        .await
    }

    /// Related proposal ids, in upstream order.
    pub async fn related(&self, id: i64) -> Lookup<Vec<i64>> {
        self.memo(|c| &mut c.related, id, || async {
            match self.source.related(id).await {
                Ok(related) => Lookup::Found(related.into_iter().map(|r| r.id).collect()),
                Err(err) => failed("related", id, err),
            }
        })
        .await
    }

    /// Full tramitation history, in upstream order.
    pub async fn history(&self, id: i64) -> Lookup<Vec<HistoryEntry>> {
        self.memo(|c| &mut c.history, id, || async {
            match self.source.history(id).await {
                Ok(history) => Lookup::Found(history),
                Err(err) => failed("history", id, err),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeSource, i64_col, proposal, str_col, status};
    use crate::to_csv;
    use serde_json::json;
    use std::sync::Arc;
    use tramita_core::render::HISTORY_SEPARATOR;
    use tramita_core::{LooseInt, RelatedEntry};

    const SEED: ProposalSeed = ProposalSeed::new("PL", 5531, 2020);

    fn history_event(when: &str, what: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Some(when.into()),
            description: Some(what.into()),
            review: Some("Proposição Sujeita à Apreciação do Plenário".into()),
            dispatch: Some("Às Comissões".into()),
        }
    }

    fn jane_doe() -> Vec<AuthorEntry> {
        vec![AuthorEntry {
            name: Some("Jane Doe".into()),
        }]
    }

    #[tokio::test]
    async fn end_to_end_single_seed() {
        let fake = Arc::new(
            FakeSource::default()
                .with_search(SEED, Ok(vec![proposal(12345, "PL", 5531, 2020)]))
                .with_status(12345, Ok(status("2023-05-10T14:30", "A", "B", "C")))
                .with_authors(12345, Ok(jane_doe()))
                .with_related(12345, Ok(vec![RelatedEntry { id: 999 }]))
                .with_history(
                    12345,
                    Ok(vec![
                        history_event("2020-11-30T10:00", "Apresentação do Projeto"),
                        history_event("2021-02-01T09:00", "Recebimento pela CCJC"),
                    ]),
                ),
        );
        let pipeline = Pipeline::new(fake.clone());
        let report = pipeline.build(&[SEED]).await.unwrap();

        assert_eq!(report.num_rows(), 1);
        assert_eq!(report.ids(), vec![12345]);
        assert_eq!(str_col(&report, "Author"), vec![Some("Jane Doe".into())]);
        assert_eq!(str_col(&report, "Related proposals"), vec![Some("999".into())]);
        assert_eq!(str_col(&report, "Last action"), vec![Some("A".into())]);
        assert_eq!(str_col(&report, "Current status"), vec![Some("B".into())]);
        assert_eq!(str_col(&report, "Last dispatch"), vec![Some("C".into())]);
        assert_eq!(i64_col(&report, "Year"), vec![2020]);

        let history = str_col(&report, "Procedural history")[0].clone().unwrap();
        let events: Vec<&str> = history.split(HISTORY_SEPARATOR).collect();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("Date/Time: 2020-11-30T10:00, Action: Apresentação"));
        assert!(events[1].contains("Recebimento pela CCJC"));

        assert_eq!(fake.calls().len(), 5);
    }

    #[tokio::test]
    async fn empty_resolution_issues_no_enrichment() {
        let fake = Arc::new(
            FakeSource::default()
                .with_search(SEED, Ok(vec![]))
                .with_search(ProposalSeed::new("PL", 1, 2000), Err(500)),
        );
        let pipeline = Pipeline::new(fake.clone());
        let report = pipeline
            .build(&[SEED, ProposalSeed::new("PL", 1, 2000)])
            .await
            .unwrap();

        assert!(report.is_empty());
        let csv = String::from_utf8(to_csv(&report).unwrap()).unwrap();
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.starts_with("Proposal ID,Type,Number,Year"));
        assert!(fake.calls().iter().all(|c| c.starts_with("search:")));
    }

    #[tokio::test]
    async fn unresolved_seeds_dropped_and_order_kept() {
        let a = ProposalSeed::new("PL", 1, 2020);
        let b = ProposalSeed::new("PL", 2, 2021);
        let c = ProposalSeed::new("PLP", 3, 2022);
        let fake = FakeSource::default()
            .with_search(a, Ok(vec![proposal(10, "PL", 1, 2020)]))
            .with_search(b, Err(503))
            .with_search(c, Ok(vec![proposal(30, "PLP", 3, 2022)]));
        let pipeline = Pipeline::new(fake);
        let proposals = pipeline.resolve_seeds(&[a, b, c]).await;
        let ids: Vec<i64> = proposals.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 30]);
        assert!(pipeline.resolve(&b).await.is_failed());
    }

    #[tokio::test]
    async fn only_first_match_is_used() {
        let fake = FakeSource::default().with_search(
            SEED,
            Ok(vec![proposal(1, "PL", 5531, 2020), proposal(2, "PL", 5531, 2020)]),
        );
        let pipeline = Pipeline::new(fake);
        let resolved = pipeline.resolve(&SEED).await;
        assert_eq!(resolved.found().map(|p| p.id), Some(1));
    }

    #[tokio::test]
    async fn report_sorted_newest_first_with_undated_last() {
        let seeds = [
            ProposalSeed::new("PL", 1, 2020),
            ProposalSeed::new("PL", 2, 2020),
            ProposalSeed::new("PL", 3, 2020),
        ];
        let fake = FakeSource::default()
            .with_search(seeds[0], Ok(vec![proposal(1, "PL", 1, 2020)]))
            .with_search(seeds[1], Ok(vec![proposal(2, "PL", 2, 2020)]))
            .with_search(seeds[2], Ok(vec![proposal(3, "PL", 3, 2020)]))
            .with_status(1, Ok(status("2021-04-01T10:00", "A", "B", "C")))
            .with_status(2, Err(500))
            .with_status(3, Ok(status("2023-09-12T16:45", "A", "B", "C")));
        let report = Pipeline::new(fake).build(&seeds).await.unwrap();
        assert_eq!(report.ids(), vec![3, 1, 2]);
    }

    #[tokio::test]
    async fn detail_placeholders_vs_failure_blanks() {
        let ok_seed = ProposalSeed::new("PL", 1, 2020);
        let bad_seed = ProposalSeed::new("PL", 2, 2020);
        let fake = FakeSource::default()
            .with_search(ok_seed, Ok(vec![proposal(1, "PL", 1, 2020)]))
            .with_search(bad_seed, Ok(vec![proposal(2, "PL", 2, 2020)]))
            .with_status(1, Ok(ProposalStatus::default()))
            .with_status(2, Err(502));
        let report = Pipeline::new(fake)
            .build(&[ok_seed, bad_seed])
            .await
            .unwrap();

        // Neither row has a parseable date, so seed order holds.
        assert_eq!(report.ids(), vec![1, 2]);
        assert_eq!(
            str_col(&report, "Last action"),
            vec![Some("no action".into()), None]
        );
        assert_eq!(
            str_col(&report, "Current status"),
            vec![Some("no status".into()), None]
        );
        assert_eq!(
            str_col(&report, "Last dispatch"),
            vec![Some("no dispatch".into()), None]
        );
        assert_eq!(
            str_col(&report, "Last review decision"),
            vec![Some("no review decision".into()), None]
        );
    }

    #[tokio::test]
    async fn author_empty_and_failure_placeholders() {
        let fake = FakeSource::default()
            .with_authors(1, Ok(vec![]))
            .with_authors(2, Err(500));
        let pipeline = Pipeline::new(fake);
        let p1 = pipeline.enrich(proposal(1, "PL", 1, 2020)).await;
        let p2 = pipeline.enrich(proposal(2, "PL", 2, 2020)).await;
        assert_eq!(p1.author, "no authors");
        assert_eq!(p2.author, "error retrieving data");
    }

    #[tokio::test]
    async fn related_failure_looks_like_no_relations() {
        let fake = FakeSource::default()
            .with_related(1, Ok(vec![]))
            .with_related(2, Err(500));
        let pipeline = Pipeline::new(fake);
        assert_eq!(pipeline.related(1).await, Lookup::Found(vec![]));
        assert!(pipeline.related(2).await.is_failed());
        let r1 = pipeline.enrich(proposal(1, "PL", 1, 2020)).await;
        let r2 = pipeline.enrich(proposal(2, "PL", 2, 2020)).await;
        assert_eq!(r1.related, r2.related);
        assert_eq!(r1.related, "");
    }

    #[tokio::test]
    async fn history_failure_sentinel() {
        let fake = FakeSource::default()
            .with_history(1, Ok(vec![]))
            .with_history(2, Err(404));
        let pipeline = Pipeline::new(fake);
        let r1 = pipeline.enrich(proposal(1, "PL", 1, 2020)).await;
        let r2 = pipeline.enrich(proposal(2, "PL", 2, 2020)).await;
        assert_eq!(r1.history, "");
        assert_eq!(r2.history, "error retrieving history");
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_cache() {
        let fake = Arc::new(FakeSource::default().with_authors(7, Ok(jane_doe())));
        let pipeline = Pipeline::new(fake.clone());

        let first = pipeline.authors(7).await;
        let second = pipeline.authors(7).await;
        assert_eq!(first, second);
        assert_eq!(fake.count("authors:7"), 1);

        pipeline.detail(7).await;
        pipeline.detail(7).await;
        pipeline.history(7).await;
        pipeline.history(7).await;
        pipeline.related(7).await;
        pipeline.related(7).await;
        assert_eq!(fake.count("status:7"), 1);
        assert_eq!(fake.count("history:7"), 1);
        assert_eq!(fake.count("related:7"), 1);
    }

    #[tokio::test]
    async fn failures_are_cached_too() {
        let fake = Arc::new(FakeSource::default().with_status(7, Err(500)));
        let pipeline = Pipeline::new(fake.clone());
        assert!(pipeline.detail(7).await.is_failed());
        assert!(pipeline.detail(7).await.is_failed());
        assert_eq!(fake.count("status:7"), 1);
    }

    #[tokio::test]
    async fn rebuild_within_window_makes_no_remote_calls() {
        let fake = Arc::new(
            FakeSource::default()
                .with_search(SEED, Ok(vec![proposal(12345, "PL", 5531, 2020)]))
                .with_authors(12345, Ok(jane_doe())),
        );
        let pipeline = Pipeline::new(fake.clone());
        let first = pipeline.build(&[SEED]).await.unwrap();
        let calls = fake.calls().len();
        let second = pipeline.build(&[SEED]).await.unwrap();
        assert_eq!(fake.calls().len(), calls);
        assert_eq!(to_csv(&first).unwrap(), to_csv(&second).unwrap());
    }

    #[tokio::test]
    async fn expired_entries_are_fetched_again() {
        let fake = Arc::new(FakeSource::default());
        let options = PipelineOptions {
            cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        let pipeline = Pipeline::with_options(fake.clone(), options);
        pipeline.history(3).await;
        pipeline.history(3).await;
        assert_eq!(fake.count("history:3"), 2);
    }

    #[tokio::test]
    async fn build_drops_expired_lookups() {
        let options = PipelineOptions {
            cache_ttl: Duration::ZERO,
            ..Default::default()
        };
        let pipeline = Pipeline::with_options(FakeSource::default(), options);
        pipeline.detail(3).await;
        pipeline.history(3).await;
        pipeline.build(&[]).await.unwrap();
        assert_eq!(pipeline.lock_cache().purge_expired(Instant::now()), 0);
    }

    #[tokio::test]
    async fn build_keeps_fresh_lookups() {
        let pipeline = Pipeline::new(FakeSource::default());
        pipeline.detail(3).await;
        pipeline.build(&[]).await.unwrap();
        let later = Instant::now() + DEFAULT_CACHE_TTL;
        assert_eq!(pipeline.lock_cache().purge_expired(later), 1);
    }

    #[tokio::test]
    async fn bad_year_fails_the_build() {
        let mut bad = proposal(5, "PL", 5, 2020);
        bad.year = LooseInt::from("n/a");
        let fake = FakeSource::default()
            .with_search(SEED, Ok(vec![proposal(4, "PL", 4, 2020)]))
            .with_search(ProposalSeed::new("PL", 5, 2020), Ok(vec![bad]));
        let err = Pipeline::new(fake)
            .build(&[SEED, ProposalSeed::new("PL", 5, 2020)])
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Coercion { id: 5, column: "year", .. }));
    }

    #[tokio::test]
    async fn non_integer_year_fails_the_build() {
        for raw in [json!(2020.5), json!(true)] {
            let mut bad = proposal(5, "PL", 5, 2020);
            bad.year = serde_json::from_value(raw.clone()).unwrap();
            let fake = FakeSource::default().with_search(SEED, Ok(vec![bad]));
            let err = Pipeline::new(fake).build(&[SEED]).await.unwrap_err();
            assert!(
                matches!(err, ReportError::Coercion { id: 5, column: "year", .. }),
                "{raw}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn integral_float_year_is_accepted() {
        let mut whole = proposal(5, "PL", 5, 2020);
        whole.year = serde_json::from_value(json!(2020.0)).unwrap();
        let fake = FakeSource::default().with_search(SEED, Ok(vec![whole]));
        let report = Pipeline::new(fake).build(&[SEED]).await.unwrap();
        assert_eq!(i64_col(&report, "Year"), vec![2020]);
    }

    #[tokio::test]
    async fn concurrent_lookups_match_sequential() {
        let source = || {
            FakeSource::default()
                .with_search(SEED, Ok(vec![proposal(12345, "PL", 5531, 2020)]))
                .with_status(12345, Ok(status("2023-05-10T14:30", "A", "B", "C")))
                .with_authors(12345, Ok(jane_doe()))
                .with_related(12345, Ok(vec![RelatedEntry { id: 999 }]))
                .with_history(12345, Err(500))
        };
        let sequential = Pipeline::new(source()).build(&[SEED]).await.unwrap();
        let options = PipelineOptions {
            concurrent_lookups: true,
            ..Default::default()
        };
        let concurrent = Pipeline::with_options(source(), options)
            .build(&[SEED])
            .await
            .unwrap();
        assert_eq!(to_csv(&sequential).unwrap(), to_csv(&concurrent).unwrap());
    }
}
