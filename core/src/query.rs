//! The generic accumulate-then-evaluate engine.
//!
//! Every entity builder wraps a [`Query`]: one candidate source, one filter
//! chain, four terminal operations. Nothing is evaluated until a terminal
//! operation runs; filters and branches only accumulate. Terminal operations
//! re-resolve the source each call, so `get()` reflects the registry state at
//! call time.
//!
//! Builders consume and return `self`, so a query is built linearly and then
//! executed — there is no shared-mutation lifecycle to misuse.

use crate::chain::FilterChain;
use crate::source::{CandidateSource, Discover};
use crate::trace::ChainTrace;
use crate::Filter;

/// One candidate source plus one filter chain, with terminal operations.
///
/// `first`, `exists`, and `count` are all derived from [`Query::get`], which
/// keeps them consistent by construction.
///
/// # Example
///
/// ```
/// use scry::Query;
///
/// let query = Query::new(|| vec![1, 2, 3, 4])
///     .filter("is even", |n: &i32| n % 2 == 0);
///
/// assert_eq!(query.get(), vec![2, 4]);
/// assert_eq!(query.first(), Some(2));
/// assert!(query.exists());
/// assert_eq!(query.count(), 2);
/// ```
#[derive(Debug)]
pub struct Query<C> {
    source: CandidateSource<C>,
    chain: FilterChain<C>,
}

impl<C: Clone> Query<C> {
    /// A query that discovers candidates through `discover`.
    pub fn new(discover: impl Discover<C> + 'static) -> Self {
        Self {
            source: CandidateSource::discovered(discover),
            chain: FilterChain::new(),
        }
    }

    /// Restrict the query to exactly these candidates instead of discovery.
    ///
    /// An explicitly empty list yields no results; this is distinct from not
    /// calling `among` at all, which enumerates the live source.
    #[must_use]
    pub fn among(mut self, candidates: impl IntoIterator<Item = C>) -> Self {
        self.source.set_explicit(candidates.into_iter().collect());
        self
    }

    /// Append a filter to the primary AND chain.
    #[must_use]
    pub fn filter(mut self, description: impl Into<String>, filter: impl Filter<C> + 'static) -> Self {
        self.chain.push(description, filter);
        self
    }

    /// Append one OR-branch.
    #[must_use]
    pub fn branch(mut self, branch: FilterChain<C>) -> Self {
        self.chain.add_branch(branch);
        self
    }

    /// The accumulated chain.
    #[must_use]
    pub fn chain(&self) -> &FilterChain<C> {
        &self.chain
    }

    /// Consume the query, keeping only its chain. Used when a nested builder
    /// is harvested into an OR-branch.
    #[must_use]
    pub fn into_chain(self) -> FilterChain<C> {
        self.chain
    }

    /// Resolve the source and return the candidates that pass the chain, in
    /// enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<C> {
        let candidates = self.source.resolve();
        // Explicit passthrough: an empty chain returns the source unchanged,
        // and an empty source stays empty.
        if self.chain.matches_all() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|c| self.chain.evaluate(c))
            .collect()
    }

    /// First match in enumeration order, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<C> {
        self.get().into_iter().next()
    }

    /// `true` if at least one candidate matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        !self.get().is_empty()
    }

    /// Number of matching candidates.
    #[must_use]
    pub fn count(&self) -> usize {
        self.get().len()
    }

    /// Trace the chain against one candidate: which filters passed, which
    /// branches fired. Evaluates everything, no short-circuit.
    #[must_use]
    pub fn explain(&self, candidate: &C) -> ChainTrace {
        self.chain.evaluate_with_trace(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["FooX", "YBar", "FooBar", "Zzz"]
            .iter()
            .map(|s| (*s).to_string())
            .collect()
    }

    // ========== Terminal operations ==========

    #[test]
    fn empty_chain_is_identity_passthrough() {
        let query = Query::new(names);
        assert_eq!(query.get(), names());
        assert_eq!(query.count(), 4);
    }

    #[test]
    fn empty_source_with_empty_chain_is_empty() {
        let query: Query<String> = Query::new(Vec::new);
        assert!(query.get().is_empty());
        assert!(!query.exists());
        assert_eq!(query.first(), None);
    }

    #[test]
    fn terminal_operations_agree() {
        let query = Query::new(names).filter("has Foo", |n: &String| n.contains("Foo"));

        let got = query.get();
        assert_eq!(query.count(), got.len());
        assert_eq!(query.exists(), query.count() > 0);
        assert_eq!(query.first(), got.first().cloned());
    }

    #[test]
    fn first_on_no_matches_is_none() {
        let query = Query::new(names).filter("impossible", |_: &String| false);
        assert_eq!(query.first(), None);
        assert!(!query.exists());
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn results_preserve_enumeration_order() {
        let query = Query::new(names).filter("has o or a", |n: &String| {
            n.contains('o') || n.contains('a')
        });
        assert_eq!(
            query.get(),
            vec!["FooX".to_string(), "YBar".to_string(), "FooBar".to_string()]
        );
    }

    // ========== among ==========

    #[test]
    fn among_replaces_discovery() {
        let query = Query::new(names).among(vec!["Only".to_string()]);
        assert_eq!(query.get(), vec!["Only".to_string()]);
    }

    #[test]
    fn among_empty_yields_zero_even_with_discovery_available() {
        let query = Query::new(names).among(Vec::new());
        assert_eq!(query.count(), 0);
    }

    #[test]
    fn among_is_still_filtered() {
        let query = Query::new(Vec::new)
            .among(names())
            .filter("ends with Bar", |n: &String| n.ends_with("Bar"));
        assert_eq!(query.get(), vec!["YBar".to_string(), "FooBar".to_string()]);
    }

    // ========== Composition ==========

    #[test]
    fn or_branch_unions_match_sets() {
        let mut branch = FilterChain::new();
        branch.push("ends with Bar", |n: &String| n.ends_with("Bar"));

        let query = Query::new(names)
            .filter("starts with Foo", |n: &String| n.starts_with("Foo"))
            .branch(branch);

        assert_eq!(
            query.get(),
            vec!["FooX".to_string(), "YBar".to_string(), "FooBar".to_string()]
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let query = Query::new(names).filter("has Foo", |n: &String| n.contains("Foo"));
        assert_eq!(query.get(), query.get());
    }

    #[test]
    fn snapshot_changes_are_visible_per_call() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let grown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&grown);
        let query = Query::new(move || {
            let mut v = vec!["A".to_string()];
            if flag.load(Ordering::SeqCst) {
                v.push("B".to_string());
            }
            v
        });

        assert_eq!(query.count(), 1);
        grown.store(true, Ordering::SeqCst);
        assert_eq!(query.count(), 2);
    }

    // ========== Tracing ==========

    #[test]
    fn explain_agrees_with_membership() {
        let query = Query::new(names).filter("starts with Foo", |n: &String| n.starts_with("Foo"));
        let results = query.get();

        for name in names() {
            let trace = query.explain(&name);
            assert_eq!(trace.matched, results.contains(&name));
        }
    }
}
