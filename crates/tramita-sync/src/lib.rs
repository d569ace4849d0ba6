//! Sync layer: lookups against the Chamber of Deputies open-data API and a
//! time-boxed memo for their results.

mod cache;
mod error;
mod source;

pub use cache::TtlCache;
pub use error::SyncError;
pub use source::ProposalSource;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{CamaraClient, DEFAULT_BASE_URL};
