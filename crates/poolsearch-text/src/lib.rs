//! poolsearch-text
//!
//! Tantivy-backed pool indexing and querying: schema/analyzer setup, the
//! build pipeline with atomic index promotion, the read-only query path and
//! the HTML result formatter.

pub mod analyzer;
pub mod build;
pub mod error;
pub mod format;
pub mod query;

pub use build::{BuildSummary, IndexBuilder};
pub use error::{BuildError, QueryError};
pub use query::{MatchSet, QueryEngine, SearchHit};
