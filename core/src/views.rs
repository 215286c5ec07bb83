//! View finder queries.
//!
//! A [`ViewSource`] lists compiled template names and serves raw template
//! text; [`ViewQuery`] filters by dotted name, file path, and template
//! directives. The directive checks ([`extends_view`](ViewQuery::extends_view),
//! [`includes_view`](ViewQuery::includes_view)) are **best-effort text
//! scraping** over raw template content: a regex looks for the directive with
//! the target inside a quoted argument. There is no template parser here, and
//! dynamically composed view names are invisible to it.

use crate::name_match::{self, NameMatch};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// One discoverable template.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewRecord {
    /// Dotted view name (`emails.invoice`).
    pub name: String,
    /// Source file path, as the host reports it.
    pub path: String,
}

impl ViewRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The host's view finder.
pub trait ViewSource: Send + Sync {
    /// All discoverable views, in the finder's enumeration order.
    fn views(&self) -> Vec<ViewRecord>;

    /// Raw template text for one view. `None` when unreadable; directive
    /// filters then treat the view as not matching.
    fn contents(&self, view: &ViewRecord) -> Option<String>;
}

/// One compiled directive scan: matches when the target name appears quoted
/// inside the directive's argument list. `[^)]*` before the quote admits
/// non-first arguments (`@includeWhen($cond, 'name')`).
fn directive_regex(directives: &str, target: &str) -> Result<Regex, IntrospectError> {
    let raw = format!(
        r#"@(?:{directives})\s*\([^)]*['"]{}['"]"#,
        regex::escape(target)
    );
    Regex::new(&raw).map_err(|e| IntrospectError::InvalidPattern {
        pattern: target.to_string(),
        source: e.to_string(),
    })
}

/// Fluent queries over the view finder.
pub struct ViewQuery {
    source: Arc<dyn ViewSource>,
    query: Query<ViewRecord>,
}

impl ViewQuery {
    pub fn new(source: Arc<dyn ViewSource>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || discover.views());
        Self { source, query }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "view", matcher, |v: &ViewRecord| {
            v.name.as_str()
        });
        self
    }

    fn path_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "path", matcher, |v: &ViewRecord| {
            v.path.as_str()
        });
        self
    }

    /// Scan template contents for a directive naming `target`, with the
    /// pattern compiled once here at registration.
    fn directive_filter(
        mut self,
        description: String,
        directives: &str,
        target: &str,
    ) -> Result<Self, IntrospectError> {
        let regex = directive_regex(directives, target)?;
        let source = Arc::clone(&self.source);
        self.query = self.query.filter(description, move |v: &ViewRecord| {
            source.contents(v).is_some_and(|text| regex.is_match(&text))
        });
        Ok(self)
    }

    /// Keep views whose dotted name matches a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_name(self, pattern: &str) -> Result<Self, IntrospectError> {
        Ok(self.name_filter(NameMatch::wildcard(pattern)?))
    }

    #[must_use]
    pub fn where_name_equals(self, name: impl Into<String>) -> Self {
        self.name_filter(NameMatch::Equals(name.into()))
    }

    #[must_use]
    pub fn where_name_starts_with(self, prefix: impl Into<String>) -> Self {
        self.name_filter(NameMatch::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn where_name_ends_with(self, suffix: impl Into<String>) -> Self {
        self.name_filter(NameMatch::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn where_name_contains(self, needle: impl Into<String>) -> Self {
        self.name_filter(NameMatch::Contains(needle.into()))
    }

    /// Keep views whose path matches a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_path(self, pattern: &str) -> Result<Self, IntrospectError> {
        Ok(self.path_filter(NameMatch::wildcard(pattern)?))
    }

    #[must_use]
    pub fn where_path_equals(self, path: impl Into<String>) -> Self {
        self.path_filter(NameMatch::Equals(path.into()))
    }

    #[must_use]
    pub fn where_path_starts_with(self, prefix: impl Into<String>) -> Self {
        self.path_filter(NameMatch::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn where_path_ends_with(self, suffix: impl Into<String>) -> Self {
        self.path_filter(NameMatch::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn where_path_contains(self, needle: impl Into<String>) -> Self {
        self.path_filter(NameMatch::Contains(needle.into()))
    }

    /// Keep views whose template extends the target layout
    /// (`@extends('target')`). Best-effort text scan; views with unreadable
    /// contents never match.
    ///
    /// # Errors
    ///
    /// Fails at registration when the scan pattern does not compile.
    pub fn extends_view(self, target: &str) -> Result<Self, IntrospectError> {
        let description = format!("extends view \"{target}\"");
        self.directive_filter(description, "extends", target)
    }

    /// Keep views whose template includes the target through any include
    /// directive (`@include`, `@includeIf`, `@includeWhen`, `@includeUnless`,
    /// `@includeFirst`). Best-effort text scan; views with unreadable
    /// contents never match.
    ///
    /// # Errors
    ///
    /// Fails at registration when the scan pattern does not compile.
    pub fn includes_view(self, target: &str) -> Result<Self, IntrospectError> {
        let description = format!("includes view \"{target}\"");
        self.directive_filter(
            description,
            "includeUnless|includeWhen|includeFirst|includeIf|include",
            target,
        )
    }

    /// Restrict the query to exactly these views instead of the live finder.
    #[must_use]
    pub fn among(mut self, views: impl IntoIterator<Item = ViewRecord>) -> Self {
        self.query = self.query.among(views);
        self
    }

    /// Open an OR-branch over the same finder. Nested `or` calls inside the
    /// callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::new(Arc::clone(&self.source)))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching views, in enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<ViewRecord> {
        self.query.get()
    }

    /// First matching view, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<ViewRecord> {
        self.query.first()
    }

    /// `true` if any view matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching views.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one view.
    #[must_use]
    pub fn explain(&self, view: &ViewRecord) -> ChainTrace {
        self.query.explain(view)
    }
}

impl fmt::Debug for ViewQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
