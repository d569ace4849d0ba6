//! Report layer: seed resolution, enrichment lookups, Arrow assembly, CSV export.

mod assemble;
mod error;
mod export;
mod pipeline;

#[cfg(test)]
mod testing;

pub use assemble::{Report, ReportRow, assemble};
pub use error::ReportError;
pub use export::{CSV_FILE_NAME, to_csv, write_csv};
pub use pipeline::{DEFAULT_CACHE_TTL, Pipeline, PipelineOptions};
