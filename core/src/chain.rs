//! AND/OR filter chain composition.
//!
//! A [`FilterChain`] owns an ordered primary list of filters (AND semantics)
//! and zero or more OR-branches, each itself a chain. A candidate passes the
//! chain if it passes every primary filter, or it passes every filter of at
//! least one OR-branch. An empty chain passes everything (vacuous AND).
//!
//! Branches are consulted through their own primary filters only: they do not
//! inherit the outer primary filters, and they do not combine with each other.

use crate::trace::{BranchTrace, ChainTrace, FilterTrace};
use crate::Filter;
use std::fmt;

struct NamedFilter<C> {
    description: String,
    filter: Box<dyn Filter<C>>,
}

impl<C> NamedFilter<C> {
    fn trace(&self, candidate: &C) -> FilterTrace {
        FilterTrace {
            matched: self.filter.matches(candidate),
            description: self.description.clone(),
        }
    }
}

/// The composed AND/OR structure of all filters registered on a builder.
///
/// Evaluation is deterministic and referentially transparent with respect to
/// the injected snapshots: two evaluations of an unmodified chain against the
/// same candidate agree.
///
/// # Example
///
/// ```
/// use scry::FilterChain;
///
/// let mut chain = FilterChain::new();
/// chain.push("starts with Foo", |n: &String| n.starts_with("Foo"));
///
/// let mut branch = FilterChain::new();
/// branch.push("ends with Bar", |n: &String| n.ends_with("Bar"));
/// chain.add_branch(branch);
///
/// assert!(chain.evaluate(&"FooX".to_string()));
/// assert!(chain.evaluate(&"YBar".to_string()));
/// assert!(!chain.evaluate(&"Zzz".to_string()));
/// ```
pub struct FilterChain<C> {
    filters: Vec<NamedFilter<C>>,
    branches: Vec<FilterChain<C>>,
}

impl<C> Default for FilterChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FilterChain<C> {
    /// Create an empty chain (matches every candidate).
    #[must_use]
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            branches: Vec::new(),
        }
    }

    /// Append a filter to the primary AND chain.
    ///
    /// The description names what the filter checks; it appears in
    /// [`ChainTrace`] output.
    pub fn push(&mut self, description: impl Into<String>, filter: impl Filter<C> + 'static) {
        self.filters.push(NamedFilter {
            description: description.into(),
            filter: Box::new(filter),
        });
    }

    /// Append one OR-branch.
    ///
    /// The branch is consulted through its primary filters only; branches of
    /// the branch are ignored by evaluation.
    pub fn add_branch(&mut self, branch: FilterChain<C>) {
        self.branches.push(branch);
    }

    /// `true` if the chain has no filters and no branches, i.e. it matches
    /// every candidate. Callers use this to pass sources through untouched
    /// instead of relying on the vacuous AND.
    #[must_use]
    pub fn matches_all(&self) -> bool {
        self.filters.is_empty() && self.branches.is_empty()
    }

    /// Number of primary filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// `true` if the primary chain is empty (branches may still exist).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Number of OR-branches.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Descriptions of the primary filters, in registration order.
    #[must_use]
    pub fn descriptions(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.description.as_str()).collect()
    }

    /// Evaluate the chain: primary passes, or any single OR-branch's own
    /// primary passes.
    ///
    /// With no branches this is exactly the primary AND. With an empty primary
    /// it is vacuously true.
    #[must_use]
    pub fn evaluate(&self, candidate: &C) -> bool {
        self.primary_matches(candidate)
            || self.branches.iter().any(|b| b.primary_matches(candidate))
    }

    /// Evaluate with full visibility: every filter runs, no short-circuit.
    #[must_use]
    pub fn evaluate_with_trace(&self, candidate: &C) -> ChainTrace {
        let primary: Vec<FilterTrace> = self.filters.iter().map(|f| f.trace(candidate)).collect();
        let primary_matched = primary.iter().all(|t| t.matched);

        let branches: Vec<BranchTrace> = self
            .branches
            .iter()
            .map(|b| {
                let filters: Vec<FilterTrace> =
                    b.filters.iter().map(|f| f.trace(candidate)).collect();
                BranchTrace {
                    matched: filters.iter().all(|t| t.matched),
                    filters,
                }
            })
            .collect();

        ChainTrace {
            matched: primary_matched || branches.iter().any(|b| b.matched),
            primary,
            branches,
        }
    }

    fn primary_matches(&self, candidate: &C) -> bool {
        self.filters.iter().all(|f| f.filter.matches(candidate))
    }
}

impl<C> fmt::Debug for FilterChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterChain")
            .field("filters", &self.descriptions())
            .field("branches", &self.branches.len())
            .finish()
    }
}
