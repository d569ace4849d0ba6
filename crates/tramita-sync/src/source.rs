use std::sync::Arc;

use async_trait::async_trait;
use tramita_core::{AuthorEntry, HistoryEntry, Proposal, ProposalSeed, ProposalStatus, RelatedEntry};

use crate::SyncError;

/// The remote lookups the report pipeline depends on.
///
/// `search` is a filtered, one-item search; the other four fetch a
/// sub-resource of an already-resolved proposal by its upstream id.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    /// Search for a seed, oldest year first, at most one match.
    async fn search(&self, seed: &ProposalSeed) -> Result<Vec<Proposal>, SyncError>;

    /// Current procedural status (`statusProposicao`).
    async fn status(&self, id: i64) -> Result<ProposalStatus, SyncError>;

    async fn authors(&self, id: i64) -> Result<Vec<AuthorEntry>, SyncError>;

    async fn related(&self, id: i64) -> Result<Vec<RelatedEntry>, SyncError>;

    /// Full tramitation log, in upstream order.
    async fn history(&self, id: i64) -> Result<Vec<HistoryEntry>, SyncError>;
}

#[async_trait]
impl<T: ProposalSource + ?Sized> ProposalSource for Arc<T> {
    async fn search(&self, seed: &ProposalSeed) -> Result<Vec<Proposal>, SyncError> {
        (**self).search(seed).await
    }

    async fn status(&self, id: i64) -> Result<ProposalStatus, SyncError> {
        (**self).status(id).await
    }

    async fn authors(&self, id: i64) -> Result<Vec<AuthorEntry>, SyncError> {
        (**self).authors(id).await
    }

    async fn related(&self, id: i64) -> Result<Vec<RelatedEntry>, SyncError> {
        (**self).related(id).await
    }

    async fn history(&self, id: i64) -> Result<Vec<HistoryEntry>, SyncError> {
        (**self).history(id).await
    }
}
