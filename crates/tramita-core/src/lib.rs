pub mod proposal;
pub mod render;
pub mod schema;
pub mod seeds;
pub mod timestamp;

pub use proposal::{
    AuthorEntry, HistoryEntry, LooseInt, Lookup, Proposal, ProposalSeed, ProposalStatus,
    RelatedEntry,
};
pub use schema::report;
pub use seeds::TRACKED_SEEDS;
pub use timestamp::parse_last_action;
