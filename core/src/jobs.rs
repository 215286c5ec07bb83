//! Queue-job discovery and static job configuration.
//!
//! Jobs are not registered anywhere; [`JobQuery`] discovers them by running
//! the host's [`Conventions`] heuristic (marker interface, class-name
//! pattern, or namespace fragment) over the type snapshot. Everything a job
//! declares about its queueing (queue name, connection, tries, backoff) is
//! read from default-valued properties without instantiating the class, so
//! each answer is a [`StaticProp`]: absent, statically known, or declared
//! but only determinable at runtime.

use crate::host::Conventions;
use crate::name_match::{self, NameMatch};
use crate::reflect::{TypeRecord, TypeSource, TypeSourceExt};
use crate::trace::ChainTrace;
use crate::{IntrospectError, Query};
use std::fmt;
use std::sync::Arc;

/// A property value scraped from a declaration instead of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticProp<T> {
    /// The property is not declared anywhere on the type.
    Absent,
    /// The property has a literal default the snapshot captured.
    Value(T),
    /// The property exists but its value is only knowable at runtime
    /// (no default, a computed default, or a non-public declaration).
    Dynamic,
}

impl<T> StaticProp<T> {
    /// The statically known value, if there is one.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            Self::Absent | Self::Dynamic => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic)
    }
}

/// Strip one layer of matching quotes from a captured literal.
fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|r| r.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    trimmed.to_string()
}

/// Elements of a flat array literal such as `['a', 'b']`. Anything more
/// structured comes back empty.
fn parse_array_literal(raw: &str) -> Vec<String> {
    let Some(inner) = raw
        .trim()
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
    else {
        return Vec::new();
    };
    inner
        .split(',')
        .map(unquote)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Read a property's default off the declaration, walking inherited and
/// trait-provided properties.
fn static_prop(source: &dyn TypeSource, type_name: &str, property: &str) -> StaticProp<String> {
    match source.find_property(type_name, property) {
        None => StaticProp::Absent,
        Some(record) => {
            if !record.visibility.is_public() {
                return StaticProp::Dynamic;
            }
            match (record.has_default, record.default) {
                (true, Some(raw)) => StaticProp::Value(unquote(&raw)),
                _ => StaticProp::Dynamic,
            }
        }
    }
}

/// Fluent queries over classes the queue heuristic accepts.
pub struct JobQuery {
    source: Arc<dyn TypeSource>,
    conventions: Conventions,
    query: Query<String>,
}

impl JobQuery {
    /// Discover job classes in the snapshot via the conventions heuristic.
    pub fn new(source: Arc<dyn TypeSource>, conventions: Conventions) -> Self {
        let discover = Arc::clone(&source);
        let discover_conventions = conventions.clone();
        let query = Query::new(move || {
            discover
                .type_names()
                .into_iter()
                .filter(|name| discover_conventions.is_job(&discover, name))
                .collect()
        });
        Self {
            source,
            conventions,
            query,
        }
    }

    fn name_filter(mut self, matcher: NameMatch) -> Self {
        self.query = name_match::filter_on(self.query, "job", matcher, |n: &String| n.as_str());
        self
    }

    /// Keep jobs whose qualified class name matches a wildcard pattern.
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

    /// Keep jobs whose statically declared queue equals `queue`. Jobs with a
    /// runtime-only or absent queue never match.
    #[must_use]
    pub fn on_queue(mut self, queue: impl Into<String>) -> Self {
        let queue = queue.into();
        let source = Arc::clone(&self.source);
        let description = format!("on queue \"{queue}\"");
        self.query = self.query.filter(description, move |name: &String| {
            static_prop(source.as_ref(), name, "queue").value() == Some(&queue)
        });
        self
    }

    /// Keep jobs whose statically declared connection equals `connection`.
    #[must_use]
    pub fn on_connection(mut self, connection: impl Into<String>) -> Self {
        let connection = connection.into();
        let source = Arc::clone(&self.source);
        let description = format!("on connection \"{connection}\"");
        self.query = self.query.filter(description, move |name: &String| {
            static_prop(source.as_ref(), name, "connection").value() == Some(&connection)
        });
        self
    }

    /// Keep jobs implementing one of the uniqueness markers.
    #[must_use]
    pub fn unique(mut self) -> Self {
        let source = Arc::clone(&self.source);
        let markers = self.conventions.unique_markers.clone();
        self.query = self.query.filter("unique", move |name: &String| {
            markers.iter().any(|m| source.implements(name, m))
        });
        self
    }

    /// Keep jobs implementing one of the encryption markers.
    #[must_use]
    pub fn encrypted(mut self) -> Self {
        let source = Arc::clone(&self.source);
        let markers = self.conventions.encrypted_markers.clone();
        self.query = self.query.filter("encrypted", move |name: &String| {
            markers.iter().any(|m| source.implements(name, m))
        });
        self
    }

    /// Restrict the query to exactly these class names instead of running
    /// discovery.
    #[must_use]
    pub fn among(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.query = self.query.among(names.into_iter().map(Into::into));
        self
    }

    /// Open an OR-branch over the same discovery. Nested `or` calls inside
    /// the callback are ignored.
    ///
    /// # Errors
    ///
    /// Propagates pattern-compilation failures from inside the callback.
    pub fn or(
        mut self,
        build: impl FnOnce(Self) -> Result<Self, IntrospectError>,
    ) -> Result<Self, IntrospectError> {
        let nested = build(Self::new(
            Arc::clone(&self.source),
            self.conventions.clone(),
        ))?;
        self.query = self.query.branch(nested.query.into_chain());
        Ok(self)
    }

    /// All matching job class names, in snapshot enumeration order.
    #[must_use]
    pub fn get(&self) -> Vec<String> {
        self.query.get()
    }

    /// First matching class name, or `None`.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.query.first()
    }

    /// `true` if any job matches.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.query.exists()
    }

    /// Number of matching jobs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.query.count()
    }

    /// Trace the filter chain against one class name.
    #[must_use]
    pub fn explain(&self, name: &str) -> ChainTrace {
        self.query.explain(&name.to_string())
    }
}

impl fmt::Debug for JobQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQuery")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

/// Detail view over one dispatchable job class.
pub struct JobIntrospector {
    source: Arc<dyn TypeSource>,
    conventions: Conventions,
    record: TypeRecord,
}

impl JobIntrospector {
    /// Look up a job class and check it could actually be dispatched.
    ///
    /// # Errors
    ///
    /// [`IntrospectError::UnknownType`] when the class is absent;
    /// [`IntrospectError::NotInstantiable`] when it exists but could never
    /// be constructed (interface, trait, enum, abstract, or a non-public
    /// constructor).
    pub fn new(
        source: Arc<dyn TypeSource>,
        conventions: Conventions,
        name: &str,
    ) -> Result<Self, IntrospectError> {
        let record = source
            .lookup(name)
            .ok_or_else(|| IntrospectError::UnknownType {
                name: name.to_string(),
            })?;
        if let Some(reason) = record.uninstantiable_reason() {
            return Err(IntrospectError::NotInstantiable {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(Self {
            source,
            conventions,
            record,
        })
    }

    /// Fully qualified class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    #[must_use]
    pub fn short_name(&self) -> &str {
        self.record.short_name()
    }

    /// Declared queue name.
    #[must_use]
    pub fn queue(&self) -> StaticProp<String> {
        self.prop("queue")
    }

    /// Declared queue connection.
    #[must_use]
    pub fn connection(&self) -> StaticProp<String> {
        self.prop("connection")
    }

    /// Declared attempt limit. A non-numeric default is reported as
    /// [`StaticProp::Dynamic`].
    #[must_use]
    pub fn tries(&self) -> StaticProp<u32> {
        match self.prop("tries") {
            StaticProp::Absent => StaticProp::Absent,
            StaticProp::Dynamic => StaticProp::Dynamic,
            StaticProp::Value(raw) => match raw.parse() {
                Ok(n) => StaticProp::Value(n),
                Err(_) => StaticProp::Dynamic,
            },
        }
    }

    /// Declared backoff, as the raw literal (a number or an array spelling).
    #[must_use]
    pub fn backoff(&self) -> StaticProp<String> {
        self.prop("backoff")
    }

    /// `true` when the class implements one of the queue markers.
    #[must_use]
    pub fn should_queue(&self) -> bool {
        self.implements_any(&self.conventions.queue_markers)
    }

    /// `true` when the class implements one of the uniqueness markers.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.implements_any(&self.conventions.unique_markers)
    }

    /// `true` when the class implements one of the encryption markers.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.implements_any(&self.conventions.encrypted_markers)
    }

    /// `true` when the class declares a `middleware` hook method.
    #[must_use]
    pub fn has_middleware_hook(&self) -> bool {
        self.source.find_method(&self.record.name, "middleware").is_some()
    }

    /// Middleware classes the job asks for, best-effort: read from a
    /// default-valued `middleware` property when one exists. A hook method
    /// is runtime behavior, so it contributes nothing here.
    #[must_use]
    pub fn middleware(&self) -> Vec<String> {
        match self.prop("middleware") {
            StaticProp::Value(raw) => parse_array_literal(&raw),
            StaticProp::Absent | StaticProp::Dynamic => Vec::new(),
        }
    }

    /// The underlying type record.
    #[must_use]
    pub fn record(&self) -> &TypeRecord {
        &self.record
    }

    fn prop(&self, property: &str) -> StaticProp<String> {
        static_prop(self.source.as_ref(), &self.record.name, property)
    }

    fn implements_any(&self, markers: &[String]) -> bool {
        markers
            .iter()
            .any(|m| self.source.implements(&self.record.name, m))
    }
}

impl fmt::Debug for JobIntrospector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobIntrospector")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}
