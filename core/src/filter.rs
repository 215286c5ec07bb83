//! The filter trait: one predicate over one candidate.
//!
//! Builders accept anything implementing [`Filter<C>`]; in practice that is
//! almost always a closure, via the blanket impl for `Fn(&C) -> bool`.
//! Filters are evaluated once per candidate per terminal call, so they must be
//! side-effect-free and repeatable.

/// A predicate over one candidate value.
///
/// `Send + Sync` so a built query can move across threads. Implementations
/// must be pure with respect to the candidate: the same candidate and the same
/// injected snapshot always produce the same answer.
///
/// # Example
///
/// ```
/// use scry::Filter;
///
/// fn takes_filter(f: impl Filter<String>) -> bool {
///     f.matches(&"App\\User".to_string())
/// }
///
/// // Closures are filters.
/// assert!(takes_filter(|name: &String| name.starts_with("App\\")));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot filter `{C}` candidates",
    label = "not a `Filter<{C}>`",
    note = "implement `Filter<{C}>` or use a closure `Fn(&{C}) -> bool`"
)]
pub trait Filter<C>: Send + Sync {
    /// Test one candidate.
    fn matches(&self, candidate: &C) -> bool;
}

impl<C, F> Filter<C> for F
where
    F: Fn(&C) -> bool + Send + Sync,
{
    fn matches(&self, candidate: &C) -> bool {
        self(candidate)
    }
}

impl<C> Filter<C> for Box<dyn Filter<C>> {
    fn matches(&self, candidate: &C) -> bool {
        (**self).matches(candidate)
    }
}
