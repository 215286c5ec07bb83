//! Route table queries.
//!
//! A [`RouteSource`] hands over the host router's table as plain
//! [`RouteRecord`]s; [`RouteQuery`] filters them by name, uri, HTTP verb,
//! middleware, and handler. Routes are matched as data, the layer never
//! dispatches anything.

use crate::name_match::{self, NameMatch};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// One registered route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteRecord {
    /// Route name, when the host named it.
    pub name: Option<String>,
    pub uri: String,
    /// HTTP verbs this route answers.
    pub methods: Vec<String>,
    /// Middleware entries verbatim, including parameterized ones
    /// (`throttle:60,1`).
    pub middleware: Vec<String>,
    /// Handling controller class, absent for closure routes.
    pub controller: Option<String>,
    /// Handling method on the controller.
    pub action: Option<String>,
}

impl RouteRecord {
    /// A nameless `GET` route with no middleware and no handler.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            name: None,
            uri: uri.into(),
            methods: vec!["GET".to_string()],
            middleware: Vec::new(),
            controller: None,
            action: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_methods(mut self, methods: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_middleware(
        mut self,
        middleware: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_handler(mut self, controller: impl Into<String>, action: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self.action = Some(action.into());
        self
    }

    /// `true` if the route answers this verb, case-insensitively.
    #[must_use]
    pub fn responds_to(&self, verb: &str) -> bool {
        self.methods.iter().any(|m| m.eq_ignore_ascii_case(verb))
    }

    /// `true` if a middleware entry matches, exactly or by the base name of a
    /// parameterized entry (`has_middleware("throttle")` finds
    /// `throttle:60,1`).
    #[must_use]
    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware
            .iter()
            .any(|m| m == name || m.split(':').next() == Some(name))
    }
}

/// The host router's table.
pub trait RouteSource: Send + Sync {
    /// All registered routes, in registration order.
    fn routes(&self) -> Vec<RouteRecord>;
}

/// Fluent queries over the route table.
///
/// # Example
///
/// ```
/// use scry::{RouteQuery, RouteRecord, RouteSource};
/// use std::sync::Arc;
///
/// struct Table(Vec<RouteRecord>);
///
/// impl RouteSource for Table {
///     fn routes(&self) -> Vec<RouteRecord> {
///         self.0.clone()
///     }
/// }
///
/// let table = Table(vec![
///     RouteRecord::new("users").with_name("users.index"),
///     RouteRecord::new("users")
///         .with_methods(["POST"])
///         .with_name("users.store"),
/// ]);
///
/// let posts = RouteQuery::new(Arc::new(table)).where_method("POST");
/// assert_eq!(posts.count(), 1);
/// ```
pub struct RouteQuery {
    source: Arc<dyn RouteSource>,
    query: Query<RouteRecord>,
}

impl RouteQuery {
    pub fn new(source: Arc<dyn RouteSource>) -> Self {
        let discover = Arc::clone(&source);
        let query = Query::new(move || discover.routes());
        Self { source, query }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "name", matcher, |r: &RouteRecord| {
            r.name.as_deref().unwrap_or("")
        });
        self
    }

    fn uri_filter(mut self, matcher: NameMatch) -> Self {
        self.query =
            name_match::filter_on(self.query, "uri", matcher, |r: &RouteRecord| r.uri.as_str());
        self
    }

    /// Keep routes whose name matches a wildcard pattern. Unnamed routes
    /// never match a name filter.
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

    /// Keep routes whose uri matches a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_uri(self, pattern: &str) -> Result<Self, IntrospectError> {
        Ok(self.uri_filter(NameMatch::wildcard(pattern)?))
    }

    #[must_use]
    pub fn where_uri_equals(self, uri: impl Into<String>) -> Self {
        self.uri_filter(NameMatch::Equals(uri.into()))
    }

    #[must_use]
    pub fn where_uri_starts_with(self, prefix: impl Into<String>) -> Self {
        self.uri_filter(NameMatch::StartsWith(prefix.into()))
    }

    #[must_use]
    pub fn where_uri_ends_with(self, suffix: impl Into<String>) -> Self {
        self.uri_filter(NameMatch::EndsWith(suffix.into()))
    }

    #[must_use]
    pub fn where_uri_contains(self, needle: impl Into<String>) -> Self {
        self.uri_filter(NameMatch::Contains(needle.into()))
    }

    /// Keep routes answering an HTTP verb (case-insensitive).
    #[must_use]
    pub fn where_method(mut self, verb: impl Into<String>) -> Self {
        let verb = verb.into();
        let description = format!("responds to {}", verb.to_ascii_uppercase());
        self.query = self
            .query
            .filter(description, move |r: &RouteRecord| r.responds_to(&verb));
        self
    }

    /// Keep routes carrying a middleware entry, exactly or by parameterized
    /// base name (see [`RouteRecord::has_middleware`]).
    #[must_use]
    pub fn uses_middleware(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        let description = format!("uses middleware \"{name}\"");
        self.query = self
            .query
            .filter(description, move |r: &RouteRecord| r.has_middleware(&name));
        self
    }

    /// Keep routes whose controller class matches a wildcard pattern.
    /// Closure routes never match.
    ///
    /// # Errors
    ///
    /// Fails at registration when the pattern does not compile.
    pub fn where_controller(mut self, pattern: &str) -> Result<Self, IntrospectError> {
        let matcher = NameMatch::wildcard(pattern)?;
        self.query =
            name_match::filter_on(self.query, "controller", matcher, |r: &RouteRecord| {
                r.controller.as_deref().unwrap_or("")
            });
        Ok(self)
    }

    /// Keep routes handled by exactly this action method.
    #[must_use]
    pub fn where_action_equals(mut self, action: impl Into<String>) -> Self {
        let action = action.into();
        let description = format!("action equals \"{action}\"");
        self.query = self.query.filter(description, move |r: &RouteRecord| {
            r.action.as_deref() == Some(action.as_str())
        });
        self
    }

    /// Restrict the query to exactly these routes instead of the live table.
    #[must_use]
    pub fn among(mut self, routes: impl IntoIterator<Item = RouteRecord>) -> Self {
        self.query = self.query.among(routes);
        self
    }

    /// Open an OR-branch: the callback receives a fresh builder over the same
    /// table, and a route matches the overall query if it passes the primary
    /// filters or the branch's. Nested `or` calls inside the callback are
    /// ignored.
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

    /// All matching routes, in registration order.
    #[must_use]
    pub fn get(&self) -> Vec<RouteRecord> {
        self.query.get()
    }

    /// First matching route, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<RouteRecord> {
        self.query.first()
    }

    /// `true` if any route matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching routes.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one route.
    #[must_use]
    pub fn explain(&self, route: &RouteRecord) -> ChainTrace {
        self.query.explain(route)
    }
}

impl fmt::Debug for RouteQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
