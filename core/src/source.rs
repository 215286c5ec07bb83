//! Candidate enumeration: explicit lists and live discovery.
//!
//! Every query builder owns one [`CandidateSource`]. Until `among()` is
//! called the source is *unset* and resolution asks the injected
//! [`Discover`] enumerator for a fresh snapshot; after `among()` it returns
//! exactly the supplied list. An explicitly empty list is a valid selection
//! that yields zero candidates — distinct from unset.

use std::fmt;
use std::sync::Arc;

/// Live enumeration of a candidate universe.
///
/// Implementations return a point-in-time snapshot; the engine re-resolves on
/// every terminal call, so results may differ between calls only if the
/// underlying registry changed. Closures `Fn() -> Vec<C>` implement this
/// directly.
pub trait Discover<C>: Send + Sync {
    /// Enumerate the current candidates, in registry enumeration order.
    fn candidates(&self) -> Vec<C>;
}

impl<C, F> Discover<C> for F
where
    F: Fn() -> Vec<C> + Send + Sync,
{
    fn candidates(&self) -> Vec<C> {
        self()
    }
}

/// Tri-state candidate selection: unset (discover live) or explicitly set
/// (return the list verbatim, empty included).
pub struct CandidateSource<C> {
    explicit: Option<Vec<C>>,
    discover: Arc<dyn Discover<C>>,
}

impl<C: Clone> CandidateSource<C> {
    /// A source that discovers candidates through `discover` until a list is
    /// supplied.
    pub fn discovered(discover: impl Discover<C> + 'static) -> Self {
        Self {
            explicit: None,
            discover: Arc::new(discover),
        }
    }

    /// Replace discovery with an explicit candidate list.
    ///
    /// Calling this again replaces the previous list. An empty list is kept
    /// as-is and yields zero candidates.
    pub fn set_explicit(&mut self, candidates: Vec<C>) {
        self.explicit = Some(candidates);
    }

    /// `true` once an explicit list has been supplied.
    #[must_use]
    pub fn is_explicit(&self) -> bool {
        self.explicit.is_some()
    }

    /// Resolve the current candidates: the explicit list if set, otherwise a
    /// fresh discovery snapshot. Order is enumeration order, never sorted.
    #[must_use]
    pub fn resolve(&self) -> Vec<C> {
        match &self.explicit {
            Some(candidates) => candidates.clone(),
            None => self.discover.candidates(),
        }
    }
}

impl<C> fmt::Debug for CandidateSource<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.explicit {
            Some(candidates) => write!(f, "CandidateSource::Explicit({})", candidates.len()),
            None => write!(f, "CandidateSource::Discovered"),
        }
    }
}
