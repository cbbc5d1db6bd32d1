//! Typed failures surfaced by the graph store and the tree projection.

use thiserror::Error;

/// A query against the graph store could not be answered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store was torn down; every later query fails.
    #[error("graph store has been closed")]
    Closed,
    #[error("graph store query failed: {0}")]
    Query(String),
}

/// Failures of the hosting-view operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    /// Index outside the current bounds; re-query the counts.
    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
    /// No rows are visible at all.
    #[error("no visible rows")]
    Empty,
    /// A row or column handle from an earlier enumeration (or another
    /// projection) was passed back in.
    #[error("stale or foreign row/column reference")]
    InvalidReference,
    #[error("graph store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

pub type Result<T, E = ProjectionError> = std::result::Result<T, E>;
