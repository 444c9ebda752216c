//! Unified error type for graph-dissect public APIs.

use thiserror::Error;

/// Errors reported by separation, induction and ordering routines.
///
/// Failures are recovered only at the granularity of "abandon this recursion
/// subtree and report upward"; there is no partial-result salvage. After a
/// reported error the whole [`Order`](crate::order::Order) must be discarded.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DissectError {
    /// An allocation failed during induction, state snapshot or tree-node
    /// creation. Fatal to the current recursion subtree; no retry.
    #[error("out of memory")]
    OutOfMemory,
    /// A strategy tree referenced an unregistered method, carried a parameter
    /// record of the wrong kind, or a condition evaluated to an unexpected
    /// value kind. A configuration defect, propagated immediately.
    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),
    /// A debug-build invariant was violated.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(&'static str),
    /// Malformed adjacency input at graph construction.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),
}

/// Convenient result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DissectError>;

pub(crate) fn invalid_strategy(msg: impl Into<String>) -> DissectError {
    DissectError::InvalidStrategy(msg.into())
}

/// Allocates a vector of the exact requested capacity, reporting
/// [`DissectError::OutOfMemory`] instead of aborting on allocation failure.
pub(crate) fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| DissectError::OutOfMemory)?;
    Ok(v)
}
