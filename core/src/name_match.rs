//! Declarative name predicates.
//!
//! [`NameMatch`] is the vocabulary behind every `where_name`-family filter:
//! the trivial string checks plus the wildcard [`Pattern`]. Builders construct
//! one per filter registration and move it into the filter closure, so the
//! (only) expensive variant is compiled exactly once.

use crate::{IntrospectError, Pattern};
use std::fmt;

/// One name predicate: how a candidate name must relate to a needle.
///
/// # Example
///
/// ```
/// use scry::NameMatch;
///
/// let m = NameMatch::EndsWith("Controller".to_string());
/// assert!(m.matches("App\\Http\\Controllers\\UserController"));
///
/// let m = NameMatch::wildcard("App\\Jobs\\*")?;
/// assert!(m.matches("App\\Jobs\\SendEmail"));
/// # Ok::<(), scry::IntrospectError>(())
/// ```
#[derive(Debug, Clone)]
pub enum NameMatch {
    /// Exact equality.
    Equals(String),
    /// Prefix check.
    StartsWith(String),
    /// Suffix check.
    EndsWith(String),
    /// Substring check.
    Contains(String),
    /// Compiled wildcard pattern (see [`Pattern`]).
    Wildcard(Pattern),
}

impl NameMatch {
    /// Build the wildcard variant, compiling the pattern eagerly.
    ///
    /// # Errors
    ///
    /// Propagates [`Pattern::compile`] failures.
    pub fn wildcard(pattern: &str) -> Result<Self, IntrospectError> {
        Pattern::compile(pattern).map(Self::Wildcard)
    }

    /// Test a candidate name. Case-sensitive in every variant.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Equals(s) => name == s,
            Self::StartsWith(s) => name.starts_with(s.as_str()),
            Self::EndsWith(s) => name.ends_with(s.as_str()),
            Self::Contains(s) => name.contains(s.as_str()),
            Self::Wildcard(p) => p.matches(name),
        }
    }
}

impl fmt::Display for NameMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(s) => write!(f, "equals \"{s}\""),
            Self::StartsWith(s) => write!(f, "starts with \"{s}\""),
            Self::EndsWith(s) => write!(f, "ends with \"{s}\""),
            Self::Contains(s) => write!(f, "contains \"{s}\""),
            Self::Wildcard(p) => write!(f, "matches \"{p}\""),
        }
    }
}

/// Register a [`NameMatch`] against one string field of the candidate.
///
/// The shared plumbing behind every `where_name` / `where_uri` / `where_path`
/// family: the field label feeds the filter description, the accessor picks
/// the string out of the candidate.
pub(crate) fn filter_on<C: Clone + 'static>(
    query: crate::Query<C>,
    field: &'static str,
    matcher: NameMatch,
    accessor: impl Fn(&C) -> &str + Send + Sync + 'static,
) -> crate::Query<C> {
    let description = format!("{field} {matcher}");
    query.filter(description, move |candidate: &C| {
        matcher.matches(accessor(candidate))
    })
}
