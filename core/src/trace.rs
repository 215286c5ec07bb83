//! Evaluation trace types for debugging filter chains.
//!
//! Trace types mirror the chain structure ([`FilterChain`](crate::FilterChain))
//! but capture per-filter outcomes instead of filters. Use
//! `evaluate_with_trace()` (or [`Query::explain`](crate::Query::explain)) to
//! see which filters accepted or rejected a candidate.
//!
//! Tracing evaluates every filter — no short-circuiting — so a failing AND
//! chain still shows the outcome of each of its filters.

use std::fmt;

/// One filter's outcome for one candidate.
pub struct FilterTrace {
    /// Whether the filter accepted the candidate.
    pub matched: bool,
    /// The description supplied at filter registration
    /// (e.g. `"name matches \"App\\Models\\*\""`).
    pub description: String,
}

impl fmt::Debug for FilterTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.matched { "pass" } else { "fail" };
        write!(f, "{mark}: {}", self.description)
    }
}

/// One OR-branch's outcome: its own primary filters, AND-combined.
pub struct BranchTrace {
    /// Whether every filter in the branch accepted the candidate.
    pub matched: bool,
    /// Trace of each branch filter (all evaluated, no short-circuit).
    pub filters: Vec<FilterTrace>,
}

impl fmt::Debug for BranchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BranchTrace")
            .field("matched", &self.matched)
            .field("filters", &self.filters)
            .finish()
    }
}

/// Trace of a full chain evaluation for one candidate.
///
/// `matched` always equals what `evaluate()` would return for the same
/// candidate: the primary chain passing, or any OR-branch passing.
pub struct ChainTrace {
    /// The overall verdict for this candidate.
    pub matched: bool,
    /// Trace of each primary filter (all evaluated, no short-circuit).
    pub primary: Vec<FilterTrace>,
    /// Trace of each OR-branch.
    pub branches: Vec<BranchTrace>,
}

impl ChainTrace {
    /// Whether the primary AND chain (ignoring OR-branches) passed.
    #[must_use]
    pub fn primary_matched(&self) -> bool {
        self.primary.iter().all(|t| t.matched)
    }
}

impl fmt::Debug for ChainTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainTrace")
            .field("matched", &self.matched)
            .field("primary", &self.primary)
            .field("branches", &self.branches)
            .finish()
    }
}
